use crate::demo::{
    run_batch, run_classify, run_patients, run_score, BatchArgs, ClassifyArgs, PatientsArgs,
    ScoreArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use pancscreen::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "pancscreen",
    about = "Serve and exercise the pancreatic screening risk engine from the command line",
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
    /// Classify a single biomarker value against its reference thresholds
    Classify(ClassifyArgs),
    /// Compute the local fallback risk score from CA 19-9, creatinine and age
    Score(ScoreArgs),
    /// List the demo patient roster
    Patients(PatientsArgs),
    /// Assess every sample in a biomarker CSV export
    Batch(BatchArgs),
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
        Command::Classify(args) => run_classify(args),
        Command::Score(args) => run_score(args),
        Command::Patients(args) => run_patients(args),
        Command::Batch(args) => run_batch(args).await,
    }
}
