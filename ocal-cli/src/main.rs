mod client;
mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ocal_core::config::GlobalConfig;
use ocal_core::tz::{TimezoneContext, parse_tz};

#[derive(Parser)]
#[command(name = "ocal")]
#[command(about = "Calendar client with natural-language event creation")]
struct Cli {
    /// Timezone override for this invocation (IANA name, e.g. Europe/Dublin)
    #[arg(long, global = true)]
    tz: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show events for a date range
    Agenda {
        /// First date to show (YYYY-MM-DD, default today)
        #[arg(long)]
        from: Option<String>,

        /// Last date to show (YYYY-MM-DD, default from + 7 days)
        #[arg(long)]
        to: Option<String>,

        /// Only show events matching this text
        #[arg(long)]
        query: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an event from explicit fields
    Add {
        subject: String,

        /// Start (YYYY-MM-DDTHH:MM[:SS][±offset], or YYYY-MM-DD with --all-day)
        #[arg(short, long)]
        start: String,

        /// End (same formats; for --all-day the end date is exclusive)
        #[arg(short, long)]
        end: Option<String>,

        /// Length of the event (e.g. "45m", "1h30m"); default 1 hour
        #[arg(short, long, conflicts_with = "end")]
        duration: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(short, long)]
        body: Option<String>,

        /// Attendee email address (repeatable)
        #[arg(short, long = "attendee")]
        attendees: Vec<String>,

        /// Reminder, minutes before start
        #[arg(short, long)]
        reminder: Option<u32>,

        /// All-day event (start/end are dates)
        #[arg(long)]
        all_day: bool,

        /// Recurrence rule, e.g. "FREQ=WEEKLY;BYDAY=MO,WE"
        #[arg(long)]
        recurrence: Option<String>,
    },
    /// Create an event from natural language, e.g.
    /// "tomorrow 4pm: Coffee with Ali @ Cafe Nero"
    Quickadd {
        /// The event description
        text: Vec<String>,
    },
    /// Replace fields on an existing event
    Edit {
        id: String,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        body: Option<String>,

        /// Replacement attendee list (repeatable)
        #[arg(long = "attendee")]
        attendees: Vec<String>,

        #[arg(long)]
        reminder: Option<u32>,

        #[arg(long)]
        recurrence: Option<String>,
    },
    /// Delete an event
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Search events by text
    Search {
        query: String,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Import events from an ICS file
    Import {
        /// Path to the .ics file
        file: String,
    },
    /// Set timezone, calendar, and access token
    Configure,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = GlobalConfig::load()?;
    let ctx = build_tz_context(cli.tz.as_deref(), &config)?;

    match cli.command {
        Commands::Agenda {
            from,
            to,
            query,
            json,
        } => {
            commands::agenda::run(
                &config,
                &ctx,
                from.as_deref(),
                to.as_deref(),
                query.as_deref(),
                json,
            )
            .await
        }
        Commands::Add {
            subject,
            start,
            end,
            duration,
            location,
            body,
            attendees,
            reminder,
            all_day,
            recurrence,
        } => {
            let fields = commands::add::Fields {
                subject,
                start,
                end,
                duration,
                location,
                body,
                attendees,
                reminder,
                all_day,
                recurrence,
            };
            commands::add::run(&config, &ctx, fields).await
        }
        Commands::Quickadd { text } => {
            commands::quickadd::run(&config, &ctx, &text.join(" ")).await
        }
        Commands::Edit {
            id,
            subject,
            start,
            end,
            location,
            body,
            attendees,
            reminder,
            recurrence,
        } => {
            let changes = commands::edit::Changes {
                subject,
                start,
                end,
                location,
                body,
                attendees,
                reminder,
                recurrence,
            };
            commands::edit::run(&config, &ctx, &id, changes).await
        }
        Commands::Delete { id, yes } => commands::delete::run(&config, &ctx, &id, yes).await,
        Commands::Search {
            query,
            from,
            to,
            json,
        } => {
            commands::search::run(
                &config,
                &ctx,
                &query,
                from.as_deref(),
                to.as_deref(),
                json,
            )
            .await
        }
        Commands::Import { file } => commands::import::run(&config, &ctx, &file).await,
        Commands::Configure => commands::configure::run(&config, &ctx),
    }
}

/// Resolve the three-way timezone context for this invocation.
fn build_tz_context(override_tz: Option<&str>, config: &GlobalConfig) -> Result<TimezoneContext> {
    let system = iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse().ok())
        .unwrap_or(chrono_tz::UTC);

    let configured = config
        .resolved_timezone()
        .map(|name| parse_tz(&name))
        .transpose()?;

    let override_tz = override_tz.map(parse_tz).transpose()?;

    Ok(TimezoneContext::new(system, configured, override_tz))
}
