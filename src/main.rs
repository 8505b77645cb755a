use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use procplan::cli::setup::setup;
use procplan::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Estimate the main materials of an item
    Composition {
        /// Item to break down, e.g. "Laptop"
        item: String,
    },
    /// Look up market prices for exactly five materials
    Prices {
        #[arg(num_args = 5, required = true)]
        materials: Vec<String>,
    },
}

impl From<Commands> for procplan::AppCommand {
    fn from(cmd: Commands) -> procplan::AppCommand {
        match cmd {
            Commands::Composition { item } => procplan::AppCommand::Composition { item },
            Commands::Prices { materials } => procplan::AppCommand::Prices { materials },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => {
            procplan::run_command(cmd.into(), cli.config_path.as_deref(), cli.json).await
        }
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
