use crate::demo::{run_demo, run_rules, run_validate, DemoArgs, RulesArgs, ValidateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use plan_check::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "plan-check",
    about = "Validate CAD floor plans against the BBL CAD guideline and room lists",
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
    /// Validate a drawing export and optional room list from disk
    Validate(ValidateArgs),
    /// Print the rule catalog
    Rules(RulesArgs),
    /// Run an end-to-end demo on a bundled floor plan
    Demo(DemoArgs),
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

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Validate(args) => run_validate(args),
        Command::Rules(args) => run_rules(args),
        Command::Demo(args) => run_demo(args),
    }
}
