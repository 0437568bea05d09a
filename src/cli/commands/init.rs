//! Initialize command.

use console::style;

use crate::config::Config;
use crate::repository::DieselDbContext;

/// Create the database and its tables.
pub async fn cmd_init(config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = config.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let ctx = DieselDbContext::new(&config.database);
    ctx.init_schema().await?;

    if config.sources.is_empty() {
        println!("{} No sources configured", style("!").yellow());
        println!("  Copy jokecrawl.example.toml to jokecrawl.toml to get started");
    }

    println!(
        "{} Initialized database at {}",
        style("✓").green(),
        config.database.display()
    );

    Ok(())
}
