use crate::demo::{run_demo, run_reminder_cycle, DemoArgs, RemindArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use interntrack::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "InternTrack",
    about = "Run and demonstrate the internship tracking service from the command line",
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
    /// Run one deadline-reminder cycle against the seeded catalogue
    Remind(RemindArgs),
    /// Run an end-to-end CLI demo covering tracking, reminders, and
    /// recommendations
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
    /// Enforce the conventional application pipeline instead of the
    /// permissive transition graph
    #[arg(long)]
    pub(crate) strict_transitions: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Remind(args) => run_reminder_cycle(args),
        Command::Demo(args) => run_demo(args),
    }
}
