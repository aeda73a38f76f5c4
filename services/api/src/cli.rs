use crate::reports::{run_report, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use portfolio_analytics::analytics::ReportKind;
use portfolio_analytics::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Portfolio Analytics",
    about = "Serve or print occupancy, vacancy-loss and ranking reports for a property portfolio",
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
    /// Print a single report computed from a CSV snapshot
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Current occupancy per property, with per-unit idle days when a window is given
    Occupancy(ReportArgs),
    /// Vacancy reconstructed from lease history and the revenue it cost (window required)
    Loss(ReportArgs),
    /// Properties ranked on occupancy, revenue and efficiency
    Performance(ReportArgs),
    /// Portfolio-wide rollup
    Stats(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Directory holding the CSV snapshot (overrides APP_SNAPSHOT_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report { command } => match command {
            ReportCommand::Occupancy(args) => run_report(ReportKind::Occupancy, args),
            ReportCommand::Loss(args) => run_report(ReportKind::OpportunityLoss, args),
            ReportCommand::Performance(args) => run_report(ReportKind::PropertyPerformance, args),
            ReportCommand::Stats(args) => run_report(ReportKind::OccupancyStats, args),
        },
    }
}
