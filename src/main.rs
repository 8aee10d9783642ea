use clap::{Command, CommandFactory, Parser};
use clap_complete::{generate, Generator};
use std::io;
use std::path::Path;
use telemetry_stats::cli::Commands::GenerateAutoComplete;
use telemetry_stats::cli::{Cli, Commands, EngineArgs};
use telemetry_stats::debug_calc::{debug_calc, DebugCalcRequest};
use telemetry_stats::engine::default_run_concurrency;
use telemetry_stats::error::StatsResult;
use telemetry_stats::summary::{summarize_run, RunSummary};
use telemetry_stats::utils::{
    format_count, gather_metrics_text, read_json_file, write_json, write_to_file,
};
use telemetry_stats::{EngineConfig, Metric, RawRun, RunStats, StatsEngine};
use strum::IntoEnumIterator;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> StatsResult<()> {
    let mut cmd = Cli::command();
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into());
    let subscriber = fmt()
        .pretty()
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(filter);

    subscriber.init();

    match cli.command {
        GenerateAutoComplete { shell } => {
            eprintln!("Generating completion file for {shell}...");
            print_completions(shell, &mut cmd);
        }
        Commands::Process {
            input,
            out,
            parallel,
            concurrency,
            metrics_file,
            engine,
        } => {
            let runs: Vec<RawRun> = read_json_file(input.path()).await?;
            let results = process(runs, &engine, parallel, concurrency).await?;
            write_json(&results, out.as_deref()).await?;

            if let Some(metrics_file) = metrics_file {
                dump_metrics(&metrics_file).await?;
            }
        }
        Commands::Summary {
            input,
            out,
            summary_points,
            engine,
        } => {
            let runs: Vec<RawRun> = read_json_file(input.path()).await?;
            let results = process(runs, &engine, false, None).await?;
            let summaries: Vec<RunSummary> = results
                .iter()
                .map(|run| summarize_run(run, summary_points))
                .collect();
            write_json(&summaries, out.as_deref()).await?;
        }
        Commands::DebugCalc { input, engine } => {
            let request: DebugCalcRequest = read_json_file(input.path()).await?;
            let config = EngineConfig::from(&engine);
            config.validate()?;
            let report = debug_calc(&request, &config)?;
            write_json(&report, None).await?;
        }
    }

    Ok(())
}

async fn process(
    runs: Vec<RawRun>,
    engine_args: &EngineArgs,
    parallel: bool,
    concurrency: Option<usize>,
) -> StatsResult<Vec<RunStats>> {
    let engine = StatsEngine::new(EngineConfig::from(engine_args))?;
    let metrics: Vec<Metric> = Metric::iter().collect();
    let samples: usize = runs.iter().map(RawRun::total_data_points).sum();
    info!(
        "Processing {} runs with {} samples, primary method {}",
        runs.len(),
        format_count(samples),
        engine.config().default_method
    );

    let start = Instant::now();
    let results = if parallel {
        let concurrency = concurrency.unwrap_or_else(default_run_concurrency);
        engine.process_runs(runs, &metrics, concurrency).await
    } else {
        runs.iter()
            .enumerate()
            .map(|(run_index, raw)| engine.process_run(raw, run_index, &metrics))
            .collect()
    };
    info!(
        "Processed {} runs in {:?}",
        results.len(),
        start.elapsed()
    );
    Ok(results)
}

async fn dump_metrics(metrics_file: &Path) -> StatsResult<()> {
    let metrics_text = gather_metrics_text()?;
    write_to_file(metrics_file, &metrics_text).await?;
    info!("Prometheus metrics written to {}", metrics_file.display());
    Ok(())
}

fn print_completions<G: Generator>(
    gen: G,
    cmd: &mut Command,
) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
