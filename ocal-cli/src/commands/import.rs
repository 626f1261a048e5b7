use anyhow::{Context, Result};
use ocal_core::config::GlobalConfig;
use ocal_core::ics::parse_events;
use ocal_core::tz::TimezoneContext;
use owo_colors::OwoColorize;

use crate::client::GraphClient;
use crate::render;

pub async fn run(config: &GlobalConfig, ctx: &TimezoneContext, file: &str) -> Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("could not read '{}'", file))?;

    let events = parse_events(&content, ctx)?;
    if events.is_empty() {
        println!("No events found in {}", file);
        return Ok(());
    }

    let client = GraphClient::from_config(config)?;

    let mut imported = 0;
    for event in &events {
        match client.create_event(event).await {
            Ok(created) => {
                imported += 1;
                println!("{}", render::render_event(&created, ctx.effective()));
            }
            Err(e) => {
                eprintln!("{}", format!("  Skipped '{}': {}", event.subject, e).red());
            }
        }
    }

    println!(
        "{}",
        format!("Imported {} of {} events", imported, events.len()).green()
    );

    Ok(())
}
