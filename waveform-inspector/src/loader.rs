//! Reads a directory of delimited waveform files into a [Dataset].
use crate::{
    error::LoadError,
    waveform::{ChannelTrace, Dataset, SourcedWaveform, Waveform},
};
use csv::{ReaderBuilder, StringRecord, Trim};
use novo_common::{Amplitude, Real, Time};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loads every waveform found directly in one directory.
///
/// Implementations are called concurrently from the worker pool, one
/// directory per call.
pub trait WaveformLoader: Sync {
    fn load(&self, directory: &Path) -> Result<Dataset, LoadError>;
}

impl<F> WaveformLoader for F
where
    F: Fn(&Path) -> Result<Dataset, LoadError> + Sync,
{
    fn load(&self, directory: &Path) -> Result<Dataset, LoadError> {
        self(directory)
    }
}

/// The extension of the files [CsvDirectoryLoader] reads.
pub const CSV_EXTENSION: &str = "csv";

/// Loads `*.csv` files, non-recursively, in path order.
///
/// The first row of each file names the columns. The first column is the time
/// axis and every other column is a channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvDirectoryLoader;

impl CsvDirectoryLoader {
    /// Returns the regular files matching `<directory>/*.csv`, sorted.
    /// # Error Modes
    /// - Emits [LoadError::NotADirectory] if `directory` is anything else.
    /// - Emits [LoadError::NonUnicodePath] if the glob pattern cannot be built.
    /// - Propagates [glob] errors if they occur.
    ///
    /// [glob]: glob::glob()
    pub fn list_files(directory: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let metadata = std::fs::metadata(directory).map_err(|source| LoadError::Io {
            path: directory.to_owned(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(LoadError::NotADirectory(directory.to_owned()));
        }

        let escaped = glob::Pattern::escape(
            directory
                .to_str()
                .ok_or_else(|| LoadError::NonUnicodePath(directory.to_owned()))?,
        );
        let glob_pattern = Path::new(&escaped).join(format!("*.{CSV_EXTENSION}"));
        let glob_pattern = glob_pattern
            .to_str()
            .ok_or_else(|| LoadError::NonUnicodePath(directory.to_owned()))?;

        let mut files = Vec::new();
        for path in glob::glob(glob_pattern)? {
            let path = path?;
            if path.is_file() {
                files.push(path);
            } else {
                debug!("Skipping {}, not a regular file", path.display());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Parses a single waveform file.
    pub fn read_file(path: &Path) -> Result<Waveform, LoadError> {
        let csv_error = |source| LoadError::Csv {
            path: path.to_owned(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(csv_error)?;

        let headers = reader.headers().map_err(csv_error)?.clone();
        if headers.len() < 2 {
            return Err(LoadError::MissingChannels {
                path: path.to_owned(),
                found: headers.len(),
            });
        }

        let mut time = Vec::<Time>::new();
        let mut columns = vec![Vec::<Amplitude>::new(); headers.len() - 1];
        for (index, record) in reader.records().enumerate() {
            // The header occupies the first line.
            let row = index + 2;
            let record = record.map_err(csv_error)?;
            let mut samples = parse_record(path, row, &record);
            if let Some(sample) = samples.next() {
                time.push(sample?);
            }
            for (column, sample) in columns.iter_mut().zip(samples) {
                column.push(sample?);
            }
        }
        if time.is_empty() {
            return Err(LoadError::NoSamples(path.to_owned()));
        }

        let channels = headers
            .iter()
            .skip(1)
            .zip(columns)
            .map(|(name, values)| ChannelTrace::new(name, values))
            .collect();
        Ok(Waveform::new(time, channels))
    }
}

fn parse_record<'a>(
    path: &'a Path,
    row: usize,
    record: &'a StringRecord,
) -> impl Iterator<Item = Result<Real, LoadError>> + 'a {
    record.iter().enumerate().map(move |(column, field)| {
        field
            .parse::<Real>()
            .map_err(|_| LoadError::InvalidSample {
                path: path.to_owned(),
                row,
                column: column + 1,
                value: field.to_owned(),
            })
    })
}

impl WaveformLoader for CsvDirectoryLoader {
    #[tracing::instrument(skip_all, fields(directory = %directory.display()))]
    fn load(&self, directory: &Path) -> Result<Dataset, LoadError> {
        let files = Self::list_files(directory)?;
        if files.is_empty() {
            warn!("No .{CSV_EXTENSION} files found");
        }

        let waveforms = files
            .into_iter()
            .map(|path| {
                let waveform = Self::read_file(&path)?;
                let source = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(SourcedWaveform { source, waveform })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        info!(num_waveforms = waveforms.len(), "Dataset loaded");
        Ok(Dataset::new(directory, waveforms))
    }
}
