use chrono::{DateTime, Utc};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use planq::cli::Cli;
use planq::cli::commands::{Commands, QueueCommands};
use planq::config::Config;
use planq::probe::{ActivityProbe, GithubProbeConfig, GithubSearchProbe, StaticProbe};
use planq::slots::SlotCalculator;
use planq::store::{BackoffPolicy, QueueStore};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("planq")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("planq.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn open_store(config: &Config) -> Result<Arc<QueueStore>> {
    let backoff = BackoffPolicy::from_config(&config.backoff);
    let store = QueueStore::open_with_timeout(&config.store.path, backoff, config.store.busy_timeout_ms)
        .context("Failed to open queue store")?;
    Ok(Arc::new(store))
}

fn build_probe(config: &Config) -> Arc<dyn ActivityProbe> {
    if !config.probe.enabled {
        info!("Activity probe disabled in config");
        return Arc::new(StaticProbe::disabled());
    }

    let token = std::env::var(&config.probe.token_env).ok();
    if token.is_none() {
        log::warn!(
            "{} not set; probe searches run unauthenticated",
            config.probe.token_env
        );
    }

    let probe_config = GithubProbeConfig {
        api_url: config.probe.api_url.clone(),
        bot_login: config.probe.bot_login.clone(),
        timeout: std::time::Duration::from_millis(config.probe.timeout_ms),
    };

    match GithubSearchProbe::new(probe_config, token) {
        Ok(probe) => Arc::new(probe),
        Err(e) => {
            log::warn!("Failed to build GitHub probe, falling back to zero activity: {}", e);
            Arc::new(StaticProbe::disabled())
        }
    }
}

fn build_calculator(config: &Config, store: Arc<QueueStore>) -> SlotCalculator {
    SlotCalculator::with_limits(
        store,
        build_probe(config),
        config.slots.total,
        config.slots.recharge_minutes,
    )
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        // Default: quick status summary
        None | Some(Commands::Status) => handle_status(config).await,
        Some(Commands::Health) => handle_health(config).await,
        Some(Commands::Queue { command }) => handle_queue_command(command, config),
        Some(Commands::Errors { limit }) => handle_errors_command(*limit, config),
    }
}

async fn handle_status(config: &Config) -> Result<()> {
    info!("Showing queue status");
    let store = open_store(config)?;
    let now = Utc::now();

    let ready = store.list_ready(now)?;
    let calculator = build_calculator(config, Arc::clone(&store));
    let status = calculator.snapshot(now).await?;

    println!("{}", "Queue Status:".bold());
    println!("  Ready now: {}", ready.len());
    println!(
        "  Available slots: {}/{}",
        status.available_slots, status.total_slots
    );
    if status.consumed_slots > 0 {
        println!("  Consumed slots: {}", status.consumed_slots);
    }
    if let Some(next) = status.next_slot_available_at {
        println!("  Next slot at: {}", next.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}

async fn handle_health(config: &Config) -> Result<()> {
    info!("Running health check");
    println!("{}", "System Health Check".bold());
    println!();

    // Store reachability
    println!("Store:");
    let store = match open_store(config) {
        Ok(store) => {
            let ready = store.list_ready(Utc::now())?;
            println!(
                "  {} Store accessible ({} entries ready)",
                "✓".green(),
                ready.len()
            );
            store
        }
        Err(e) => {
            println!("  {} Store error: {}", "✗".red(), e);
            return Err(e);
        }
    };

    println!();

    // Slot availability (probe failures degrade, so this only fails on
    // a store fault)
    println!("Slot Availability:");
    let calculator = build_calculator(config, store);
    match calculator.snapshot(Utc::now()).await {
        Ok(status) => {
            println!(
                "  {} {}/{} slots available",
                "✓".green(),
                status.available_slots,
                status.total_slots
            );
            if status.consumed_slots > 0 {
                println!(
                    "    ({} slots consumed in last {} min)",
                    status.consumed_slots, config.slots.recharge_minutes
                );
            }
        }
        Err(e) => {
            // Probe faults degrade inside the calculator, so only a
            // genuine store fault lands here; surface it to the operator
            println!("  {} Could not calculate slots: {}", "✗".red(), e);
            return Err(e.into());
        }
    }

    println!();

    // Probe wiring
    println!("Activity Probe:");
    if !config.probe.enabled {
        println!("  {} Probe disabled in config", "-".yellow());
    } else if std::env::var(&config.probe.token_env).is_ok() {
        println!("  {} {} present", "✓".green(), config.probe.token_env);
    } else {
        println!(
            "  {} {} not set (searches run unauthenticated)",
            "✗".red(),
            config.probe.token_env
        );
    }

    Ok(())
}

fn handle_queue_command(command: &QueueCommands, config: &Config) -> Result<()> {
    info!("Handling queue command: {:?}", command);
    let store = open_store(config)?;

    match command {
        QueueCommands::List { all } => {
            let now = Utc::now();
            // Every entry is ready eventually, so "all" is just listing
            // against the far future; ordering stays the same.
            let horizon = if *all { DateTime::<Utc>::MAX_UTC } else { now };
            let entries = store.list_ready(horizon)?;

            if entries.is_empty() {
                println!("{}", "Queue is empty".yellow());
                return Ok(());
            }

            for entry in entries {
                let marker = if entry.is_ready(now) {
                    "ready".green()
                } else {
                    "waiting".yellow()
                };
                println!(
                    "{:<8} {:<40} retries={} next={}",
                    marker,
                    entry.key(),
                    entry.retry_count,
                    entry.next_retry_at.format("%Y-%m-%d %H:%M:%S UTC"),
                );
                if let Some(err) = &entry.last_error {
                    println!("         last error: {}", err.red());
                }
            }
        }
        QueueCommands::Add { repo, number } => {
            let added = store.add_or_update(repo, *number, None)?;
            if added {
                println!("{} {}#{}", "Queued:".green(), repo, number);
            } else {
                println!("{} {}#{}", "Updated:".yellow(), repo, number);
            }
        }
        QueueCommands::Remove { repo, number } => {
            store.remove(repo, *number)?;
            println!("{} {}#{}", "Removed:".red(), repo, number);
        }
    }

    Ok(())
}

fn handle_errors_command(limit: u32, config: &Config) -> Result<()> {
    info!("Listing recent errors (limit: {})", limit);
    let store = open_store(config)?;

    let errors = store.recent_errors(limit)?;
    if errors.is_empty() {
        println!("{}", "No errors recorded".green());
        return Ok(());
    }

    for record in errors {
        let location = match (&record.repo, record.issue_number) {
            (Some(repo), Some(number)) => format!(" [{}#{}]", repo, number),
            (Some(repo), None) => format!(" [{}]", repo),
            _ => String::new(),
        };
        println!(
            "{} {}{} {}",
            record.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            record.kind.red(),
            location,
            record.message,
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
