mod commands;
mod render;
mod store;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use habitcal_core::{ClockTime, DateRange, EntityKind, HabitCalConfig, Span, StartTime, ViewType};
use tracing_subscriber::EnvFilter;

use commands::new::NewItem;

#[derive(Parser)]
#[command(name = "habitcal")]
#[command(about = "Expand your habit and task schedules into a day-by-day calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tracked habits and tasks
    List,
    /// Show the occurrences of one habit or task
    Show {
        /// Item id
        id: String,

        /// daily, weekly or monthly (defaults to the configured view)
        #[arg(long)]
        view: Option<ViewType>,

        /// Show occurrences from this date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        from: Option<String>,

        /// Show occurrences until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show what applies on each day
    Calendar {
        /// daily, weekly or monthly (defaults to the configured view)
        #[arg(long)]
        view: Option<ViewType>,

        /// First day shown (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        from: Option<String>,

        /// Last day shown (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Create a new habit or task file
    New {
        name: String,

        /// habit or task
        #[arg(long, default_value = "habit")]
        kind: EntityKind,

        /// day, week, month or year
        #[arg(long, default_value = "day")]
        span: Span,

        /// Cycle length in spans (e.g. 2 with --span week for every other week)
        #[arg(long, default_value_t = 1)]
        every: u32,

        /// Stop after this many cycles
        #[arg(long, conflicts_with = "horizon_days")]
        count: Option<u32>,

        /// Stop this many days after the start
        #[arg(long)]
        horizon_days: Option<u32>,

        /// Step text (defaults to the name)
        #[arg(long)]
        step: Option<String>,

        /// Time of day for daily steps (e.g. "07:30" or "7:30 am")
        #[arg(long)]
        at: Option<ClockTime>,

        /// Weekday for weekly items, day of month (or end_of_month) for monthly ones
        #[arg(long)]
        on: Option<String>,

        /// Start date/time (e.g. "2025-03-20" or "2025-03-20T07:00")
        #[arg(short, long)]
        start: Option<StartTime>,

        /// Write JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
    /// Validate every file in the habits directory
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = HabitCalConfig::load().context("Failed to load configuration")?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::List => commands::list::run(&config),
        Commands::Show { id, view, from, to } => {
            let range = DateRange::from_args(from.as_deref(), to.as_deref(), today)?;
            commands::show::run(&config, &id, view.unwrap_or(config.default_view), range)
        }
        Commands::Calendar { view, from, to } => {
            let range = DateRange::from_args(from.as_deref(), to.as_deref(), today)?;
            commands::calendar::run(&config, view.unwrap_or(config.default_view), range).await
        }
        Commands::New {
            name,
            kind,
            span,
            every,
            count,
            horizon_days,
            step,
            at,
            on,
            start,
            json,
        } => commands::new::run(
            &config,
            NewItem {
                name,
                kind,
                span,
                every,
                count,
                horizon_days,
                step,
                at,
                on,
                start,
                json,
            },
            today,
        ),
        Commands::Check => commands::check::run(&config),
    }
}

/// Log to stderr, filtered by HABITCAL_LOG or RUST_LOG (default: warn).
fn init_logging() {
    let filter = EnvFilter::try_from_env("HABITCAL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
