use crate::infra::{load_catalog, parse_date, parse_speed, start_of_day};
use crate::report::{print_log_entry, render_catalog, render_run};
use crate::server;
use bidmatch::config::{AppConfig, PipelineSettings};
use bidmatch::error::AppError;
use bidmatch::workflows::catalog::CatalogProvider;
use bidmatch::workflows::matching::{
    FixedClock, InstantPacer, PhaseController, RunStatus, SpeedProfile,
};
use bidmatch::workflows::proposals::ProposalImporter;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "Bid Match",
    about = "Screen, score and price procurement proposals against the product catalog",
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
    /// Run the elimination pipeline over a proposal file and print the outcome
    Run(RunArgs),
    /// List the catalog the engine matches against
    Catalog,
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

#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    /// Proposal file (.csv or .json)
    #[arg(long)]
    pub(crate) candidates: PathBuf,
    /// Pacing profile (fast or realistic). Defaults to APP_PIPELINE_SPEED.
    #[arg(long, value_parser = parse_speed)]
    pub(crate) speed: Option<SpeedProfile>,
    /// Evaluate deadlines as of this date (YYYY-MM-DD) instead of now
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip pacing delays entirely
    #[arg(long)]
    pub(crate) instant: bool,
    /// Print the final engine snapshot as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Run(args) => run_pipeline(args).await,
        Command::Catalog => list_catalog(),
    }
}

async fn run_pipeline(args: RunArgs) -> Result<(), AppError> {
    let settings = AppConfig::load()?.pipeline;
    let candidates = ProposalImporter::from_path(&args.candidates)?;
    let speed = args.speed.unwrap_or(settings.speed);
    let engine = build_engine(&settings, &args)?;

    let mut events = engine.subscribe();
    let run = engine.run(candidates, speed);
    tokio::pin!(run);

    let status = loop {
        tokio::select! {
            status = &mut run => break status,
            Ok(entry) = events.recv(), if !args.json => print_log_entry(&entry),
        }
    };
    if !args.json {
        while let Ok(entry) = events.try_recv() {
            print_log_entry(&entry);
        }
    }

    let snapshot = engine.snapshot();
    if args.json {
        let rendered = serde_json::to_string_pretty(&snapshot)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
    } else {
        render_run(&snapshot, &status);
    }

    match status {
        RunStatus::Failed(message) => Err(AppError::Pipeline(message)),
        _ => Ok(()),
    }
}

fn build_engine(settings: &PipelineSettings, args: &RunArgs) -> Result<PhaseController, AppError> {
    let catalog: Arc<dyn CatalogProvider> = Arc::new(load_catalog(settings)?);
    let mut engine = PhaseController::new(catalog, settings.thresholds.clone());
    if let Some(today) = args.today {
        engine = engine.with_clock(FixedClock(start_of_day(today)));
    }
    if args.instant {
        engine = engine.with_pacer(InstantPacer);
    }
    Ok(engine)
}

fn list_catalog() -> Result<(), AppError> {
    let settings = AppConfig::load()?.pipeline;
    let catalog = load_catalog(&settings)?;
    render_catalog(catalog.items());
    Ok(())
}
