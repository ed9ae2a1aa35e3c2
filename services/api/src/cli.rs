use crate::demo::{
    run_ask, run_catalog_list, run_catalog_show, run_demo, run_take, AskArgs, CatalogListArgs,
    CatalogShowArgs, DemoArgs, TakeArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fitscan::config::AppConfig;
use fitscan::error::AppError;
use fitscan::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "FitScan",
    about = "Serve FitScan health assessments or take them from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Browse the assessment catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Take an assessment interactively in the terminal
    Take(TakeArgs),
    /// Run a scripted assessment and print its report
    Demo(DemoArgs),
    /// Ask the health assistant a question
    Ask(AskArgs),
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// List assessments, optionally filtered by category or text
    List(CatalogListArgs),
    /// Show one assessment with its questions and options
    Show(CatalogShowArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let config = bootstrap()?;

    match command {
        Command::Serve(args) => server::run(args, config).await,
        Command::Catalog {
            command: CatalogCommand::List(args),
        } => run_catalog_list(args, &config),
        Command::Catalog {
            command: CatalogCommand::Show(args),
        } => run_catalog_show(args, &config),
        Command::Take(args) => run_take(args, &config),
        Command::Demo(args) => run_demo(args, &config),
        Command::Ask(args) => run_ask(args),
    }
}

/// Configuration plus logging, shared by every subcommand.
fn bootstrap() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;
    Ok(config)
}
