//! Source listing command.

use console::style;

use crate::config::Config;
use crate::repository::util::redact_url_password;

/// Shorten a string to `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// List configured sources.
pub async fn cmd_sources(config: &Config) -> anyhow::Result<()> {
    if config.sources.is_empty() {
        println!("{} No sources configured", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Sources").bold());
    println!("{}", "-".repeat(72));
    println!("{:<12} {:<10} {:<10} URL", "Key", "Adapter", "Comments");
    println!("{}", "-".repeat(72));

    for source in &config.sources {
        let comments = config
            .comment_adapter(&source.key)
            .map(|kind| kind.as_str())
            .unwrap_or("-");
        println!(
            "{:<12} {:<10} {:<10} {}",
            source.key,
            source.adapter.as_str(),
            comments,
            truncate(&source.url, 40)
        );
    }

    match &config.ingest_url {
        Some(url) => println!("\nForwarding to {}", redact_url_password(url)),
        None => println!("\n{} Forwarding disabled (no ingest_url)", style("!").yellow()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("http://www.example.com/long", 10), "http://...");
        assert_eq!(truncate("捧腹网捧腹网", 5), "捧腹...");
    }
}
