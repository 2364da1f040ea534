mod config;
mod telemetry;

use clap::{Parser, Subcommand};
use config::Config;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "Timestamp data ingestion service")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, default_value = "timestamp.yaml")]
    config_file_path: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the data input service
    DataInput,
    /// Load and validate the config file, then exit
    ValidateConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::from_file(&cli.config_file_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading {}: {e}", cli.config_file_path.display());
            return ExitCode::FAILURE;
        }
    };
    config.apply_env_overrides(|name| std::env::var(name).ok());

    match cli.command {
        CliCommand::ValidateConfig => match config.datainput.validate() {
            Ok(()) => {
                println!("Config is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Invalid config: {e}");
                ExitCode::FAILURE
            }
        },
        CliCommand::DataInput => run_data_input(config),
    }
}

fn run_data_input(config: Config) -> ExitCode {
    let _sentry_guard = match telemetry::init_logging(config.common.logging.as_ref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error initializing logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(metrics_config) = &config.common.metrics
        && let Err(e) = telemetry::init_metrics(metrics_config)
    {
        tracing::error!(error = %e, "Error initializing metrics");
        return ExitCode::FAILURE;
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Error building tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Starting data input service");
    match rt.block_on(datainput::run(config.datainput)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Data input service stopped");
            ExitCode::FAILURE
        }
    }
}
