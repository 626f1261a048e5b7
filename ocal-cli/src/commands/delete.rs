use anyhow::Result;
use dialoguer::Confirm;
use ocal_core::config::GlobalConfig;
use ocal_core::tz::TimezoneContext;
use owo_colors::OwoColorize;

use crate::client::GraphClient;
use crate::render;

pub async fn run(config: &GlobalConfig, ctx: &TimezoneContext, id: &str, yes: bool) -> Result<()> {
    let client = GraphClient::from_config(config)?;

    if !yes {
        let event = client.get_event(id).await?;
        println!("{}", render::render_event(&event, ctx.effective()));

        let confirmed = Confirm::new()
            .with_prompt("  Delete this event?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    client.delete_event(id).await?;
    println!("{}", format!("Deleted {}", id).green());

    Ok(())
}
