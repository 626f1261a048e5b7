use anyhow::Result;
use chrono::{Duration, Utc};
use ocal_core::config::GlobalConfig;
use ocal_core::tz::{TimezoneContext, parse_date};

use crate::client::GraphClient;
use crate::render;

pub async fn run(
    config: &GlobalConfig,
    ctx: &TimezoneContext,
    from: Option<&str>,
    to: Option<&str>,
    query: Option<&str>,
    json: bool,
) -> Result<()> {
    let client = GraphClient::from_config(config)?;

    let today = Utc::now().with_timezone(&ctx.effective()).date_naive();
    let from_date = from.map(parse_date).transpose()?.unwrap_or(today);
    let to_date = to
        .map(parse_date)
        .transpose()?
        .unwrap_or(from_date + Duration::days(7));

    // Local-midnight boundaries, end inclusive of the last date.
    let (range_start, range_end) = ctx.all_day_span(from_date, to_date)?;

    let events = client.list_events(range_start, range_end, query).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&render::events_to_json(&events))?
        );
    } else {
        println!("{}", render::render_events(&events, ctx.effective()));
    }

    Ok(())
}
