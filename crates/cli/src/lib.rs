pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "venuefit",
    about = "Venuefit compatibility engine CLI",
    long_about = "Run migrations, seed demo data, and query client-venue compatibility \
                  insights from the command line.",
    after_help = "Examples:\n  venuefit seed\n  venuefit insights --period-days 60\n  venuefit ask \"top 3 venues ranked by earnings\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo dataset into the local database")]
    Seed,
    #[command(about = "Run the full insights pipeline and print it as JSON")]
    Insights {
        #[arg(long, help = "Lookback window for performance metrics, in days")]
        period_days: Option<u32>,
        #[arg(
            long = "weight",
            value_name = "KEY=VALUE",
            help = "Override a scoring weight for this run (repeatable)"
        )]
        weights: Vec<String>,
    },
    #[command(about = "Print ranked venue recommendations per client as JSON")]
    Assignments {
        #[arg(long, help = "Lookback window for performance metrics, in days")]
        period_days: Option<u32>,
        #[arg(long, help = "Recommendations to keep per client")]
        top: Option<usize>,
    },
    #[command(about = "Print weekly schedule suggestions as JSON")]
    Schedule {
        #[arg(long, help = "Lookback window for performance metrics, in days")]
        period_days: Option<u32>,
        #[arg(long, help = "Scheduling horizon, in weeks")]
        weeks: Option<u32>,
    },
    #[command(about = "Print prioritized action items as JSON")]
    Actions {
        #[arg(long, help = "Lookback window for performance metrics, in days")]
        period_days: Option<u32>,
    },
    #[command(about = "Answer a free-text question about venues, clients, or planning")]
    Ask {
        #[arg(required = true, help = "The question to answer")]
        question: Vec<String>,
        #[arg(long, help = "Lookback window for performance metrics, in days")]
        period_days: Option<u32>,
    },
    #[command(about = "Show the effective scoring weights, optionally with overrides applied")]
    Weights {
        #[arg(
            long = "set",
            value_name = "KEY=VALUE",
            help = "Preview a weight override (repeatable)"
        )]
        set: Vec<String>,
    },
}

fn init_logging() {
    use tracing::Level;
    use venuefit_core::config::LogFormat::*;
    use venuefit_core::config::{AppConfig, LoadOptions};

    // Logging falls back to defaults when the config is unusable; the
    // command itself will report the config error.
    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);

    // Diagnostics go to stderr so command output on stdout stays
    // machine-readable.
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);
    let result = match logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
    // A second init in the same process is harmless.
    let _ = result;
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Insights { period_days, weights } => {
            commands::insights::run(period_days, &weights)
        }
        Command::Assignments { period_days, top } => {
            commands::assignments::run(period_days, top)
        }
        Command::Schedule { period_days, weeks } => commands::schedule::run(period_days, weeks),
        Command::Actions { period_days } => commands::actions::run(period_days),
        Command::Ask { question, period_days } => {
            commands::ask::run(&question.join(" "), period_days)
        }
        Command::Weights { set } => commands::weights::run(&set),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
