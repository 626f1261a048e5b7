use anyhow::{Result, bail};
use chrono::Utc;
use ocal_core::config::GlobalConfig;
use ocal_core::quickadd::compile;
use ocal_core::tz::TimezoneContext;
use owo_colors::OwoColorize;

use crate::client::GraphClient;
use crate::render;

pub async fn run(config: &GlobalConfig, ctx: &TimezoneContext, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("nothing to add. Example: ocal quickadd \"tomorrow 4pm: Coffee with Ali @ Cafe Nero\"");
    }

    let client = GraphClient::from_config(config)?;

    let draft = compile(text, Utc::now(), ctx)?;
    let event = draft.into_event();

    let created = client.create_event(&event).await?;

    println!("{}", format!("Created: {}", created.subject).green());
    println!("{}", render::render_event(&created, ctx.effective()));

    Ok(())
}
