//! `mecanum-cli` – replay driver for the mecanum odometry core.
//!
//! This binary plays the part of the control loop: it loads the vehicle
//! configuration, builds one [`Odometry`][mecanum_odometry::Odometry], feeds
//! it every record of a recorded JSON-lines log, and reports the result.
//!
//! ```text
//! mecanum-odom replay [--config PATH] [--json] [LOG|-]
//! mecanum-odom init-config [PATH]
//! ```

mod config;
mod replay;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{error, info};

use mecanum_types::OdomError;

use crate::replay::{Replayer, Summary};

/// Mecanum wheel odometry replay tool.
#[derive(Parser, Debug)]
#[command(name = "mecanum-odom", author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON-lines log through the odometry estimator.
    Replay {
        /// Vehicle configuration (defaults to ~/.mecanum/odometry.toml).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit one JSON snapshot per record instead of a summary.
        #[arg(long)]
        json: bool,

        /// Log file to replay; `-` or omitted reads stdin.
        log: Option<PathBuf>,
    },
    /// Write a configuration file populated with defaults.
    InitConfig {
        /// Destination (defaults to ~/.mecanum/odometry.toml).
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the filter (default "info"); MECANUM_LOG_FORMAT=json
    // switches to newline-delimited JSON.  Logs go to stderr so that
    // `--json` output on stdout stays machine-readable.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("MECANUM_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(io::stderr)
            .compact()
            .init();
    }

    let args = Args::parse();
    let result = match args.command {
        Command::Replay { config, json, log } => run_replay(config, json, log),
        Command::InitConfig { path } => run_init_config(path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "mecanum-odom failed");
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommands
// ─────────────────────────────────────────────────────────────────────────────

fn run_replay(
    config_path: Option<PathBuf>,
    json: bool,
    log: Option<PathBuf>,
) -> Result<(), OdomError> {
    let cfg = config::load(config_path.as_deref())?;
    info!(
        wheels_a = cfg.wheels_a,
        wheels_b = cfg.wheels_b,
        wheel_radius = cfg.wheel_radius,
        sign_convention = %cfg.sign_convention,
        window = cfg.velocity_rolling_window_size,
        "vehicle configuration loaded"
    );
    let mut replayer = Replayer::new(cfg.build_odometry()?);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut write_error = None;
    let mut emit = |snapshot: &mecanum_types::OdometrySnapshot| {
        if !json || write_error.is_some() {
            return;
        }
        let line = serde_json::to_string(snapshot).map_err(io::Error::other);
        if let Err(e) = line.and_then(|l| writeln!(out, "{l}")) {
            write_error = Some(e);
        }
    };

    let summary = match log {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(&path).map_err(|e| {
                OdomError::Config(format!("failed to open log {}: {}", path.display(), e))
            })?;
            replayer.run(BufReader::new(file), &mut emit)?
        }
        _ => replayer.run(io::stdin().lock(), &mut emit)?,
    };

    if let Some(e) = write_error {
        return Err(OdomError::Config(format!("failed to write output: {e}")));
    }
    if !json {
        print_summary(&summary);
    }
    Ok(())
}

fn run_init_config(path: Option<PathBuf>) -> Result<(), OdomError> {
    let path = path.unwrap_or_else(config::config_path);
    config::save_to(&config::Config::default(), &path)?;
    println!(
        "  {} Config written to {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_summary(summary: &Summary) {
    println!();
    println!("{}", "  Replay summary".bold().cyan());
    println!(
        "  records   {}  ({} accepted, {} skipped)",
        summary.records.to_string().bold(),
        summary.accepted.to_string().green(),
        if summary.skipped > 0 {
            summary.skipped.to_string().yellow()
        } else {
            summary.skipped.to_string().normal()
        }
    );
    println!(
        "  pose      x={:.4} m  y={:.4} m  heading={:.4} rad",
        summary.pose.x, summary.pose.y, summary.pose.heading
    );
    println!(
        "  velocity  x={:.4} m/s  y={:.4} m/s  angular={:.4} rad/s",
        summary.velocity.linear_x, summary.velocity.linear_y, summary.velocity.angular
    );
    println!();
}
