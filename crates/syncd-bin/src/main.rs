//! Tallysync daemon - syncs donation totals from a workbook sheet into a
//! record-base API.

mod app;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use syncd_config_and_utils::{init_logging, Config, Paths};

/// Tallysync command-line interface.
#[derive(Parser)]
#[command(name = "tallysyncd")]
#[command(about = "One-way donation totals sync into a record base")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Base directory for runtime files (config, state, logs). Defaults to ~/.tallysync
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync now, bypassing the rate limiter
    Run,
    /// Run one automatic-trigger sync (rate limited); intended for cron
    Tick,
    /// Stay resident and issue a rate-limited sync every interval
    Watch {
        /// Seconds between automatic trigger attempts
        #[arg(long, default_value_t = 900)]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let config = Config::load(&paths)?;

    match cli.command {
        Commands::Run => {
            app::run_manual(&config, &paths).await?;
        }
        Commands::Tick => {
            app::run_tick(&config, &paths).await?;
        }
        Commands::Watch { interval_secs } => {
            app::run_watch(&config, &paths, interval_secs).await?;
        }
    }

    Ok(())
}
