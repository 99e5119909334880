//! Rotor Sentinel - vibration fault analysis CLI
//!
//! Compares a current recording against the machine's stored no-fault
//! baseline and prints the flagged sensors with their likely defect.
//!
//! # Usage
//!
//! ```bash
//! # List registered machines
//! rotor-sentinel --list-machines
//!
//! # Analyse a recording
//! rotor-sentinel --machine gearbox_a --current today.csv
//!
//! # Machine-readable report with a custom threshold
//! rotor-sentinel --machine gearbox_a --current today.csv --threshold 0.2 --json
//! ```
//!
//! # Environment Variables
//!
//! - `ROTOR_SENTINEL_CONFIG`: Path to a TOML config file
//! - `ROTOR_SENTINEL_DATA_DIR`: Baseline directory (overrides the config)
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use rotor_sentinel::config::AnalysisConfig;
use rotor_sentinel::{load_csv, BaselineStore, MachineAnalyzer};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "rotor-sentinel")]
#[command(about = "Vibration fault analysis against per-machine baselines")]
#[command(version)]
struct CliArgs {
    /// Machine whose baseline the recording is compared against
    #[arg(long, short)]
    machine: Option<String>,

    /// CSV recording to analyse
    #[arg(long, short, value_name = "CSV")]
    current: Option<PathBuf>,

    /// Directory holding `<machine>_no_fault.csv` baselines
    #[arg(long, env = "ROTOR_SENTINEL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (default: $ROTOR_SENTINEL_CONFIG, then ./rotor_sentinel.toml)
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Relative deviation threshold, overrides [detection].threshold
    #[arg(long)]
    threshold: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// List registered machines and exit
    #[arg(long)]
    list_machines: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = resolve_config(&args)?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let store = BaselineStore::new(&config.storage.data_dir);

    if args.list_machines {
        let machines = store.machines()?;
        if machines.is_empty() {
            info!(dir = %store.dir().display(), "No machines registered");
        }
        for machine in machines {
            println!("{machine}");
        }
        return Ok(());
    }

    let (Some(machine), Some(current_path)) = (args.machine.as_deref(), args.current.as_ref())
    else {
        bail!("--machine and --current are required (or use --list-machines)");
    };

    let analyzer = MachineAnalyzer::new(&config).context("Invalid analysis configuration")?;
    let current = load_csv(current_path)
        .with_context(|| format!("Failed to load {}", current_path.display()))?;
    let report = analyzer
        .analyze_machine(&store, machine, &current)
        .with_context(|| format!("Analysis of '{machine}' failed"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.summary());
    }

    Ok(())
}

/// Load the config file, then apply command-line overrides.
fn resolve_config(args: &CliArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::load(),
    };

    if let Some(dir) = &args.data_dir {
        config.storage.data_dir.clone_from(dir);
    }
    if let Some(threshold) = args.threshold {
        config.detection.threshold = threshold;
    }
    config.validate().context("Invalid configuration")?;

    Ok(config)
}
