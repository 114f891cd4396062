use anyhow::{Context, Result};
use clap::Parser;
use novo_common::{LoggingOpts, init_tracer};
use rand::{SeedableRng, rngs::StdRng};
use std::path::PathBuf;
use tracing::info;
use waveform_simulator::{DatasetPlan, WaveformConfig, generate_datasets};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Directory under which `dataset_<k>` directories are created.
    #[clap(long)]
    output_dir: PathBuf,

    #[clap(long, default_value = "3")]
    datasets: usize,

    /// Number of waveforms written to each dataset.
    #[clap(long, default_value = "20")]
    waveforms: usize,

    /// JSON description of the waveforms, a built-in two-channel pulse if not given.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Seed of the random generator, taken from the system if not given.
    #[clap(long)]
    seed: Option<u64>,

    /// Delay of every channel after the first, per dataset index.
    #[clap(long, default_value = "0")]
    delay_step: f64,

    #[clap(flatten)]
    logging: LoggingOpts,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let tracer = init_tracer!(&args.logging).context("Initialising tracer")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting {}",
        tracer.service_name()
    );

    let config = match &args.config {
        Some(path) => WaveformConfig::from_json_file(path)
            .with_context(|| format!("Reading config {}", path.display()))?,
        None => WaveformConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "Seeding generator");

    let plan = DatasetPlan {
        num_datasets: args.datasets,
        waveforms_per_dataset: args.waveforms,
        delay_step: args.delay_step,
    };
    let directories = generate_datasets(
        &args.output_dir,
        &config,
        &plan,
        &mut StdRng::seed_from_u64(seed),
    )
    .context("Generating datasets")?;

    for directory in directories {
        println!("{}", directory.display());
    }
    Ok(())
}
