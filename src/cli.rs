use crate::config::{DensityConfig, DensityTrim, EngineConfig, DEFAULT_MAX_POINTS};
use crate::percentile::CalculationMethod;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "telemetry-stats", version, about="benchmark telemetry statistics tool", long_about = None, arg_required_else_help(true), propagate_version(true))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(arg_required_else_help = true)]
    GenerateAutoComplete { shell: Shell },

    /// Compute chart statistics and downsampled series for every run in a file.
    #[command(arg_required_else_help = true)]
    Process {
        #[arg(required = true, help = "JSON array of runs")]
        input: ExistingJsonFile,
        #[arg(short, long, help = "Write results here instead of stdout")]
        out: Option<PathBuf>,
        #[arg(
            short,
            long,
            required = false,
            default_value_t = false,
            default_missing_value = "true",
            help = "run the statistic passes of each run on the blocking thread pool"
        )]
        parallel: bool,
        #[arg(
            short,
            long,
            required = false,
            help = "Maximum number of runs processed at once (parallel mode only)"
        )]
        concurrency: Option<usize>,
        #[arg(long, help = "Dump prometheus metrics to this file when done")]
        metrics_file: Option<PathBuf>,
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Compact per-run summaries with optional series data.
    #[command(arg_required_else_help = true)]
    Summary {
        #[arg(required = true, help = "JSON array of runs")]
        input: ExistingJsonFile,
        #[arg(short, long, help = "Write results here instead of stdout")]
        out: Option<PathBuf>,
        #[arg(
            long,
            required = false,
            default_value_t = 0,
            help = "Series values to include per metric, 0 for stats only"
        )]
        summary_points: usize,
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// FPS and frametime statistics under both percentile conventions.
    #[command(arg_required_else_help = true)]
    DebugCalc {
        #[arg(required = true, help = "JSON object with fps and/or frametime arrays")]
        input: ExistingJsonFile,
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    #[arg(
        long,
        env = "TELEMETRY_MAX_POINTS",
        default_value_t = DEFAULT_MAX_POINTS,
        help = "LTTB threshold for chart series, 0 disables downsampling"
    )]
    pub max_points: usize,
    #[arg(
        long,
        value_enum,
        env = "TELEMETRY_METHOD",
        default_value_t = CalculationMethod::LinearInterpolation,
        help = "Percentile convention used for the primary stats"
    )]
    pub method: CalculationMethod,
    #[arg(
        long,
        value_enum,
        env = "TELEMETRY_DENSITY_TRIM",
        default_value_t = DensityTrim::P97,
        help = "Upper outlier cut for density histograms"
    )]
    pub density_trim: DensityTrim,
    #[arg(
        long,
        env = "TELEMETRY_DENSITY_MAX_BINS",
        help = "Merge density histograms down to at most this many bins"
    )]
    pub density_max_bins: Option<usize>,
}

impl From<&EngineArgs> for EngineConfig {
    fn from(args: &EngineArgs) -> Self {
        EngineConfig::default()
            .with_max_points(args.max_points)
            .with_default_method(args.method)
            .with_density(DensityConfig {
                trim: args.density_trim,
                max_bins: args.density_max_bins,
            })
    }
}

#[derive(Clone, Debug)]
pub struct ExistingJsonFile(PathBuf);

impl ExistingJsonFile {
    pub fn path(&self) -> &PathBuf {
        &self.0
    }
}

impl FromStr for ExistingJsonFile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = PathBuf::from(s);

        if !path.exists() {
            return Err(format!("File does not exist: {}", s));
        }

        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            return Err(format!("File must have a .json extension: {}", s));
        }

        Ok(ExistingJsonFile(path))
    }
}
