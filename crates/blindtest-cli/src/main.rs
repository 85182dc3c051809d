//! `blindtest` binary.

use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn, Instrument};

use blindtest_catalog::YoutubeCatalog;
use blindtest_cli::{init_tracing, AppError, AppResult, Args, BlindtestConfig, Pipeline, RunLogger, RunSummary};
use blindtest_media::{check_ffmpeg, check_ffprobe, check_ytdlp, FfmpegAssembler, YtDlpFetcher};
use blindtest_models::RunId;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing();

    match run(args).await {
        Ok(summary) => {
            print_reveal(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(stage = e.stage(), exit_code = e.exit_code(), "blindtest failed: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(args: Args) -> AppResult<RunSummary> {
    let config = BlindtestConfig::from_args(args)?;
    info!("Run config: {:?}", config);

    check_ytdlp()?;
    check_ffmpeg()?;
    check_ffprobe()?;

    let scratch = config.create_scratch_dir().await?;

    let catalog = YoutubeCatalog::new(config.catalog_config())?;
    let fetcher = YtDlpFetcher::new(scratch.path().join("downloads"), config.mode)
        .with_cookies(config.cookies.clone());
    let assembler = FfmpegAssembler::new(scratch.path().join("render"));

    let run_id = RunId::new();
    let span = RunLogger::new(&run_id, "blindtest").create_span();
    let pipeline = Pipeline::new(&catalog, &fetcher, &assembler).with_run_id(run_id);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let result = tokio::select! {
        result = pipeline.run(&config, &mut rng).instrument(span) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, abandoning run");
            Err(AppError::Cancelled)
        }
    };

    if let Err(e) = scratch.close() {
        warn!("Failed to remove scratch directory: {}", e);
    }

    result
}

fn print_reveal(summary: &RunSummary) {
    println!("Blind test written to {}", summary.output.display());
    if summary.skipped > 0 {
        println!("{} result(s) skipped", summary.skipped);
    }
    println!();
    println!("Answers:");
    for (i, title) in summary.answer_key.iter().enumerate() {
        println!("{:>3}. {}", i + 1, title);
    }
}
