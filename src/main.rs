use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use countryfx::core::log::init_logging;

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

#[derive(Args)]
struct ListArgs {
    /// Only countries in this region, e.g. Africa
    #[arg(long)]
    region: Option<String>,

    /// Only countries using this currency code, e.g. NGN
    #[arg(long)]
    currency: Option<String>,

    /// One of gdp_desc, gdp_asc, population_desc, population_asc, name_asc, name_desc
    #[arg(long)]
    sort: Option<String>,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch countries and exchange rates and update the store
    Refresh {
        /// Print the refresh summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored countries
    List(ListArgs),
    /// Show a single country
    Show { name: String },
    /// Delete a country from the store
    Delete { name: String },
    /// Display the number of countries and the last refresh time
    Status,
    /// Display the country count and top economies by estimated GDP
    Summary,
}

impl From<Commands> for countryfx::AppCommand {
    fn from(cmd: Commands) -> countryfx::AppCommand {
        match cmd {
            Commands::Refresh { json } => countryfx::AppCommand::Refresh { json },
            Commands::List(args) => countryfx::AppCommand::List {
                region: args.region,
                currency: args.currency,
                sort: args.sort,
                json: args.json,
            },
            Commands::Show { name } => countryfx::AppCommand::Show { name },
            Commands::Delete { name } => countryfx::AppCommand::Delete { name },
            Commands::Status => countryfx::AppCommand::Status,
            Commands::Summary => countryfx::AppCommand::Summary,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => countryfx::cli::setup::setup(),
        Some(cmd) => countryfx::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
