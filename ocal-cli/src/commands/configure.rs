use anyhow::Result;
use dialoguer::Input;
use ocal_core::config::GlobalConfig;
use ocal_core::tz::{TimezoneContext, parse_tz};
use owo_colors::OwoColorize;

pub fn run(config: &GlobalConfig, ctx: &TimezoneContext) -> Result<()> {
    let timezone: String = Input::new()
        .with_prompt("  Default timezone")
        .default(
            config
                .timezone
                .clone()
                .unwrap_or_else(|| ctx.system.name().to_string()),
        )
        .interact_text()?;
    parse_tz(&timezone)?;

    let calendar_id: String = Input::new()
        .with_prompt("  Calendar id (empty for the primary calendar)")
        .default(config.calendar_id.clone().unwrap_or_default())
        .show_default(false)
        .allow_empty(true)
        .interact_text()?;

    let token: String = Input::new()
        .with_prompt("  Access token (empty to keep the current one)")
        .allow_empty(true)
        .interact_text()?;

    let updated = GlobalConfig {
        timezone: Some(timezone),
        calendar_id: if calendar_id.is_empty() {
            None
        } else {
            Some(calendar_id)
        },
        access_token: if token.is_empty() {
            config.access_token.clone()
        } else {
            Some(token)
        },
    };
    updated.save()?;

    println!(
        "{}",
        format!("Saved {}", GlobalConfig::config_path()?.display()).green()
    );

    Ok(())
}
