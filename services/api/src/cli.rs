use crate::commands::{run_batch, run_evaluate, BatchArgs, EvaluateArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mvr_screen::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "MVR Screen",
    about = "Screen motor vehicle records against the driver hiring policy",
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
    /// Evaluate a single extracted fact record
    Evaluate(EvaluateArgs),
    /// Evaluate a JSON list of fact records and write a CSV decision report
    Batch(BatchArgs),
    /// Run sample records through the policy and print the decisions
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

/// Threshold overrides shared by the offline commands.
#[derive(Args, Debug, Default, Clone, Copy)]
pub(crate) struct PolicyArgs {
    /// Accident count at which a record is rejected
    #[arg(long)]
    pub(crate) accident_threshold: Option<u32>,
    /// Matching uninspected-vehicle violations at which a record is rejected
    #[arg(long)]
    pub(crate) uninspected_threshold: Option<u32>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Batch(args) => run_batch(args),
        Command::Demo(args) => run_demo(args),
    }
}
