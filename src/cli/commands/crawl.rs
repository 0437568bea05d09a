//! Crawl command.

use console::style;

use crate::config::Config;
use crate::pipeline::Pipeline;

/// Run one cycle and print a per-source summary.
pub async fn cmd_crawl(config: &Config, keys: &[String]) -> anyhow::Result<()> {
    let sources = config.selected_sources(keys)?;
    if sources.is_empty() {
        println!("{} No sources configured", style("!").yellow());
        return Ok(());
    }

    let pipeline = Pipeline::from_config(config)?;
    pipeline.db().init_schema().await?;
    let report = pipeline.run(&sources).await;

    println!("\n{}", style("Crawl summary").bold());
    println!("{}", "-".repeat(64));
    println!(
        "{:<14} {:>8} {:>8} {:>8} {:>9} {:>9}",
        "Source", "Scraped", "Stored", "Dupes", "Comments", "Forwarded"
    );
    println!("{}", "-".repeat(64));

    for source in &report.sources {
        let line = format!(
            "{:<14} {:>8} {:>8} {:>8} {:>9} {:>9}",
            source.key,
            source.scraped,
            source.stored,
            source.duplicates,
            source.comments_stored,
            source.forwarded
        );
        match &source.error {
            None => println!("{}", line),
            Some(e) => {
                println!("{}", style(line).red());
                println!("  {} {}", style("✗").red(), e);
            }
        }
    }

    println!("{}", "-".repeat(64));
    let failed = report.failed();
    if failed == 0 {
        println!("{} {} new posts", style("✓").green(), report.stored());
    } else {
        println!(
            "{} {} new posts, {} source(s) failed",
            style("!").yellow(),
            report.stored(),
            failed
        );
    }

    Ok(())
}
