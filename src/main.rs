use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxconv::AppCommand {
    fn from(cmd: Commands) -> fxconv::AppCommand {
        match cmd {
            Commands::Convert {
                amount,
                from,
                to,
                days,
                show_history,
            } => fxconv::AppCommand::Convert {
                amount,
                from,
                to,
                days,
                show_history,
            },
            Commands::History => fxconv::AppCommand::History,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies, prompting for missing values
    Convert {
        /// Amount to convert
        amount: Option<f64>,
        /// Currency code to convert from, e.g. EUR
        from: Option<String>,
        /// Currency code to convert to, e.g. GBP
        to: Option<String>,
        /// Number of trailing days of historical rates to show
        #[arg(short, long)]
        days: Option<u32>,
        /// Print all stored conversions afterwards
        #[arg(long)]
        show_history: bool,
    },
    /// Display all stored conversions
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxconv::cli::setup::setup(),
        Some(cmd) => fxconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
