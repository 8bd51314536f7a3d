//! quakegen - synthetic earthquake catalog generator.
//!
//! # Commands
//!
//! - `quakegen generate` - sample a synthetic catalog from fitted density models
//! - `quakegen fit <catalog.csv>` - fit both density models from a historical catalog
//! - `quakegen compare <real.csv> <synthetic.csv>` - compare primary-field distributions

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use quakegen::catalog;
use quakegen::output::write_batch_to_path;
use quakegen::summary::{compare_primary, summarize};
use quakegen::{DensityModels, EventBatch, GeneratorConfig, Result};

#[derive(Parser)]
#[command(name = "quakegen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors and skip the summary
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic catalog
    Generate(GenerateArgs),

    /// Fit both density models from a historical catalog CSV
    Fit {
        /// Historical catalog with latitude, longitude, depth and mag columns
        catalog: PathBuf,

        /// Where to write the coordinate model
        #[arg(long, default_value = "data/kde_coords.json")]
        coord_model: PathBuf,

        /// Where to write the magnitude model
        #[arg(long, default_value = "data/kde_mag.json")]
        mag_model: PathBuf,
    },

    /// Compare primary-field distributions of a real and a synthetic catalog
    Compare {
        real: PathBuf,
        synthetic: PathBuf,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// JSON config file; flags below override it
    #[arg(short, long, env = "QUAKEGEN_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// Number of records per run
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    rows: Option<i64>,

    /// First day of the date window (inclusive), YYYY-MM-DD
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Day after the date window (exclusive), YYYY-MM-DD
    #[arg(long)]
    end: Option<NaiveDate>,

    #[arg(long)]
    coord_model: Option<PathBuf>,

    #[arg(long)]
    mag_model: Option<PathBuf>,

    /// Output file; `.ndjson`/`.json` selects NDJSON, anything else CSV
    #[arg(short, long, default_value = "synthetic_earthquakes.csv")]
    output: PathBuf,

    /// Generate this many runs in parallel, seeds `seed..seed+runs`
    #[arg(long)]
    runs: Option<u64>,

    /// Directory for per-seed files when `--runs` is given
    #[arg(long, default_value = "runs")]
    output_dir: PathBuf,
}

impl GenerateArgs {
    fn resolve(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_json_file(path)?,
            None => GeneratorConfig::canonical(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(start) = self.start {
            config.window.start = start;
        }
        if let Some(end) = self.end {
            config.window.end = end;
        }
        if let Some(p) = &self.coord_model {
            config.coord_model = p.clone();
        }
        if let Some(p) = &self.mag_model {
            config.mag_model = p.clone();
        }
        Ok(config)
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Every run must succeed before any per-seed file is written. Each failure
/// is logged; the first one is returned.
fn collect_runs(results: Vec<(u64, Result<EventBatch>)>) -> Result<Vec<(u64, EventBatch)>> {
    let mut batches = Vec::with_capacity(results.len());
    let mut first_err = None;
    for (seed, result) in results {
        match result {
            Ok(batch) => batches.push((seed, batch)),
            Err(e) => {
                error!(seed, "run failed: {e}");
                first_err.get_or_insert(e);
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(batches),
    }
}

fn generate(args: &GenerateArgs, quiet: bool) -> Result<()> {
    let config = args.resolve()?;
    // Validate before touching the artifacts so bad input never loads models.
    config.validate()?;
    let models = DensityModels::from_config(&config)?;

    match args.runs {
        Some(runs) => {
            for (seed, batch) in collect_runs(models.generate_runs(&config, runs))? {
                let path = args.output_dir.join(format!("synthetic_seed_{seed}.csv"));
                write_batch_to_path(&batch, &path)?;
                if !quiet {
                    eprintln!("Seed {seed}: {} events → {}", batch.len(), path.display());
                }
            }
        }
        None => {
            let batch = models.generate(&config)?;
            write_batch_to_path(&batch, &args.output)?;
            if !quiet {
                eprint!("{}", summarize(&batch));
            }
        }
    }
    Ok(())
}

fn fit(catalog_path: &Path, coord_model: &Path, mag_model: &Path) -> Result<()> {
    let models = catalog::train(catalog_path, coord_model, mag_model)?;
    info!(
        points = models.coords.len(),
        coord_model = %coord_model.display(),
        mag_model = %mag_model.display(),
        "density models trained and saved"
    );
    Ok(())
}

fn compare(real: &Path, synthetic: &Path) -> Result<()> {
    let real_rows = catalog::read_primary_file(real)?;
    let synthetic_rows = catalog::read_primary_file(synthetic)?;
    print!("{}", compare_primary(&real_rows, &synthetic_rows));
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Generate(args) => generate(args, cli.quiet),
        Commands::Fit { catalog, coord_model, mag_model } => fit(catalog, coord_model, mag_model),
        Commands::Compare { real, synthetic } => compare(real, synthetic),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
