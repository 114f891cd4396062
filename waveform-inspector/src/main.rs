use anyhow::{Context, Result};
use clap::Parser;
use novo_common::{LoggingOpts, init_tracer};
use std::{io, path::PathBuf};
use tracing::info;
use waveform_inspector::{
    CsvDirectoryLoader, DatasetAnalysis, DatasetPipeline, LoadErrorPolicy, PipelineInput,
    PipelineOptions, PositionVector, Session,
    session::{write_data_analysis, write_statistics},
};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Directories of waveform files, one dataset each.
    directories: Vec<PathBuf>,

    /// Position tag of each directory, e.g. `--pos=(0,1.5,3)`.
    /// Defaults to the index of each directory.
    #[clap(long)]
    pos: Option<PositionVector>,

    /// What to do when a directory cannot be loaded.
    #[clap(long, value_enum, default_value_t = LoadErrorPolicy::Abort)]
    on_load_error: LoadErrorPolicy,

    /// Number of worker threads, chosen from the available cores if not set.
    #[clap(long)]
    workers: Option<usize>,

    /// Print the statistics of every dataset and exit, rather than starting
    /// the interactive session.
    #[clap(long)]
    summary: bool,

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

    let input = PipelineInput::from_paths(args.directories, args.pos.map(Vec::from))?;
    let pipeline = DatasetPipeline::new(
        CsvDirectoryLoader,
        PipelineOptions {
            on_load_error: args.on_load_error,
            workers: args.workers,
        },
    );
    let analyses = pipeline.run(&input).context("Running dataset pipeline")?;

    let stdout = io::stdout();
    if args.summary {
        write_summary(&analyses, &mut stdout.lock()).context("Writing summary")?;
    } else {
        let mut session = Session::new(analyses, rand::rng());
        session
            .run(io::stdin().lock(), &mut stdout.lock())
            .context("Running interactive session")?;
    }
    Ok(())
}

fn write_summary<W: io::Write>(analyses: &[DatasetAnalysis], out: &mut W) -> io::Result<()> {
    for analysis in analyses {
        writeln!(
            out,
            "[{}] {} (position {}, {} waveforms)",
            analysis.index,
            analysis.dataset.directory().display(),
            analysis.position,
            analysis.dataset.len()
        )?;
        write_statistics(analysis, out)?;
    }
    if analyses.len() >= 2 {
        write_data_analysis(analyses, out)?;
    }
    Ok(())
}
