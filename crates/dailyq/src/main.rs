// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! dailyq - a multi-channel daily-questions notifier.
//!
//! Binary entry point: `serve` runs the webhook gateway (plus the optional
//! in-process broadcast schedule), `broadcast` performs one start-of-day run
//! and exits, fitting an external cron.

mod broadcast;
mod serve;
mod setup;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

/// dailyq - a multi-channel daily-questions notifier.
#[derive(Parser, Debug)]
#[command(name = "dailyq", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook gateway (and the schedule loop, if configured).
    Serve,
    /// Run the daily broadcast once and exit.
    Broadcast,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match dailyq_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            dailyq_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Broadcast => broadcast::run_broadcast(config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn default_config_is_valid() {
        let config = dailyq_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.service.name, "dailyq");
    }
}
