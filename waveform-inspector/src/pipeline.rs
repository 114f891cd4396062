//! Parallel loading and feature extraction over a list of directories.
//!
//! Both phases run on a dedicated, bounded rayon pool. Each phase is an
//! ordered `par_iter().collect()`, so results line up with the input
//! directories whatever order the tasks complete in.
use crate::{
    error::{ConfigError, LoadError, PipelineError},
    features::FeatureSet,
    loader::WaveformLoader,
    parameters::LoadErrorPolicy,
    statistics::{LinearFit, StatSummary, StatisticsError, linear_fit, stats},
    waveform::Dataset,
};
use itertools::izip;
use novo_common::Position;
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Number of workers to use given the machine's available parallelism.
///
/// Keeps two cores free on larger machines and never exceeds the number of
/// directories, with a minimum of one.
pub fn worker_count(available: usize, directories: usize) -> usize {
    let workers = match available {
        0..=2 => 1,
        3..=4 => 2,
        _ => available - 2,
    };
    workers.min(directories).max(1)
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Directories to analyse, each with its position tag.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineInput {
    directories: Vec<PathBuf>,
    positions: Vec<Position>,
}

impl PipelineInput {
    /// # Parameters
    /// - directories: the dataset directories, in analysis order.
    /// - positions: one tag per directory, `[0, 1, 2, ...]` if omitted.
    /// # Error Modes
    /// - Emits [ConfigError::NoValidDirectories] if `directories` is empty.
    /// - Emits [ConfigError::PositionLengthMismatch] if the lengths differ.
    pub fn new(
        directories: Vec<PathBuf>,
        positions: Option<Vec<Position>>,
    ) -> Result<Self, ConfigError> {
        if directories.is_empty() {
            return Err(ConfigError::NoValidDirectories);
        }
        let positions = match positions {
            Some(positions) if positions.len() != directories.len() => {
                return Err(ConfigError::PositionLengthMismatch {
                    positions: positions.len(),
                    directories: directories.len(),
                });
            }
            Some(positions) => positions,
            None => (0..directories.len()).map(|i| i as Position).collect(),
        };
        Ok(Self {
            directories,
            positions,
        })
    }

    /// As [PipelineInput::new], after dropping the paths which do not exist.
    /// # Error Modes
    /// - Emits [ConfigError::NoInputPaths] if no paths are given at all.
    /// - Emits [ConfigError::NoValidDirectories] if none of them exist.
    /// - Emits [ConfigError::PositionLengthMismatch] if `positions` does not
    ///   match the paths which remain.
    pub fn from_paths(
        paths: Vec<PathBuf>,
        positions: Option<Vec<Position>>,
    ) -> Result<Self, ConfigError> {
        if paths.is_empty() {
            return Err(ConfigError::NoInputPaths);
        }
        let directories = paths
            .into_iter()
            .filter(|path| {
                let exists = path.exists();
                if !exists {
                    warn!("{} does not exist, ignoring", path.display());
                }
                exists
            })
            .collect();
        Self::new(directories, positions)
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub on_load_error: LoadErrorPolicy,
    /// Overrides [worker_count]; still clamped to the number of directories.
    pub workers: Option<usize>,
}

/// Everything known about one input directory after the pipeline has run.
#[derive(Debug, Clone)]
pub struct DatasetAnalysis {
    /// Index of the directory in the pipeline input.
    pub index: usize,
    pub position: Position,
    pub dataset: Dataset,
    pub features: FeatureSet,
}

pub struct DatasetPipeline<L> {
    loader: L,
    options: PipelineOptions,
}

impl<L: WaveformLoader> DatasetPipeline<L> {
    pub fn new(loader: L, options: PipelineOptions) -> Self {
        Self { loader, options }
    }

    fn build_pool(&self, num_directories: usize) -> Result<ThreadPool, PipelineError> {
        let workers = match self.options.workers {
            Some(workers) => workers.clamp(1, num_directories.max(1)),
            None => worker_count(available_parallelism(), num_directories),
        };
        info!(workers, "Building worker pool");
        Ok(ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("inspector-worker-{index}"))
            .build()?)
    }

    /// Loads every directory then extracts the features of every dataset.
    /// # Return
    /// One [DatasetAnalysis] per successfully loaded directory, in input order.
    /// # Error Modes
    /// - Emits [PipelineError::Load] for the first failing directory, in input
    ///   order, under [LoadErrorPolicy::Abort].
    /// - Emits [PipelineError::ThreadPool] if the worker pool cannot be built.
    #[tracing::instrument(skip_all, fields(
        num_directories = input.len(),
        on_load_error = %self.options.on_load_error,
    ))]
    pub fn run(&self, input: &PipelineInput) -> Result<Vec<DatasetAnalysis>, PipelineError> {
        let pool = self.build_pool(input.len())?;

        let loaded: Vec<Result<Dataset, LoadError>> = pool.install(|| {
            input
                .directories()
                .par_iter()
                .map(|directory| self.loader.load(directory))
                .collect()
        });

        let mut kept = Vec::with_capacity(loaded.len());
        for (index, directory, &position, result) in izip!(
            0..,
            input.directories(),
            input.positions(),
            loaded
        ) {
            match result {
                Ok(dataset) => {
                    if dataset.is_empty() {
                        warn!(directory = %directory.display(), "Dataset has no waveforms");
                    }
                    kept.push((index, position, dataset));
                }
                Err(source) => self.handle_load_error(directory, source)?,
            }
        }

        let analyses = pool.install(|| {
            kept.into_par_iter()
                .map(|(index, position, dataset)| DatasetAnalysis {
                    index,
                    position,
                    features: FeatureSet::extract(&dataset),
                    dataset,
                })
                .collect::<Vec<_>>()
        });
        info!(num_datasets = analyses.len(), "Pipeline complete");
        Ok(analyses)
    }

    fn handle_load_error(&self, directory: &Path, source: LoadError) -> Result<(), PipelineError> {
        match self.options.on_load_error {
            LoadErrorPolicy::Abort => Err(PipelineError::Load {
                directory: directory.to_owned(),
                source,
            }),
            LoadErrorPolicy::Skip => {
                warn!(directory = %directory.display(), "Skipping directory: {source}");
                Ok(())
            }
        }
    }
}

/// The summary of one dataset's crossing differences, tagged with its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoincidencePoint {
    pub position: Position,
    pub summary: StatSummary,
}

/// Pairs each dataset's position with the summary of its crossing differences.
/// # Error Modes
/// - Emits [StatisticsError::EmptyInput] if any dataset has no waveforms.
pub fn coincidence_view(
    analyses: &[DatasetAnalysis],
) -> Result<Vec<CoincidencePoint>, StatisticsError> {
    analyses
        .iter()
        .map(|analysis| {
            Ok(CoincidencePoint {
                position: analysis.position,
                summary: stats(analysis.features.crossing_differences())?,
            })
        })
        .collect()
}

/// Straight line through the mean crossing difference at each position.
pub fn coincidence_fit(points: &[CoincidencePoint]) -> Result<LinearFit, StatisticsError> {
    let points: Vec<_> = points
        .iter()
        .map(|point| (point.position, point.summary.mean))
        .collect();
    linear_fit(&points)
}
