use crate::commands::{run_categories, run_submit, CategoriesArgs, SubmitArgs};
use crate::console::{run_console, ConsoleArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use request_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Volunteer Request Intake",
    about = "Collect roster-verified volunteer requests over HTTP or the command line",
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
    /// List the request categories offered to a volunteer role
    Categories(CategoriesArgs),
    /// Submit a single request and print its confirmation
    Submit(SubmitArgs),
    /// Run the interactive intake form on the terminal
    Intake(ConsoleArgs),
    /// Walk through a scripted intake session against an in-memory roster
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
        Command::Categories(args) => run_categories(args),
        Command::Submit(args) => run_submit(args),
        Command::Intake(args) => run_console(args),
        Command::Demo(args) => run_demo(args),
    }
}
