use std::path::PathBuf;

use crate::commands::{run_assess, run_batch, run_config_show, run_config_validate};
use crate::commands::{AssessArgs, BatchArgs};
use crate::demo::{run_demo, DemoArgs};
use clap::{Parser, Subcommand};
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "loan-risk",
    about = "Score loan applications with the deterministic risk assessment engine",
    version
)]
struct Cli {
    /// Risk configuration JSON file, overriding RISK_CONFIG_PATH
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assess a single applicant snapshot stored as JSON
    Assess(AssessArgs),
    /// Assess every applicant in a CSV export concurrently
    Batch(BatchArgs),
    /// Inspect or validate risk configurations
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Run the reference applicants through the full service workflow
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration JSON file without activating it
    Validate {
        /// Path to the configuration JSON file
        path: PathBuf,
    },
    /// Print the configuration that assessments would use
    Show,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let Cli { config, command } = Cli::parse();
    let app_config = AppConfig::load()?;
    telemetry::init(&app_config.telemetry)?;

    let config = config.as_deref();
    match command {
        Command::Assess(args) => run_assess(args, config, &app_config),
        Command::Batch(args) => run_batch(args, config, &app_config).await,
        Command::Config {
            command: ConfigCommand::Validate { path },
        } => run_config_validate(&path),
        Command::Config {
            command: ConfigCommand::Show,
        } => run_config_show(config, &app_config),
        Command::Demo(args) => run_demo(args, config, &app_config),
    }
}
