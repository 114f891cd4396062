use glob::{GlobError, PatternError};
use std::path::PathBuf;
use thiserror::Error;

pub use crate::statistics::StatisticsError;

/// Problems with the command line, detected before any file is read.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Pass a directory as an argument")]
    NoInputPaths,
    #[error("No valid directories found")]
    NoValidDirectories,
    #[error("Position vector has {positions} entries but {directories} directories were given")]
    PositionLengthMismatch {
        positions: usize,
        directories: usize,
    },
    #[error("Cannot parse position vector '{input}': {reason}")]
    InvalidPosition { input: String, reason: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO Error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Cannot convert path to string: {0}")]
    NonUnicodePath(PathBuf),
    #[error("Glob Pattern Error: {0}")]
    GlobPattern(#[from] PatternError),
    #[error("Glob Error: {0}")]
    Glob(#[from] GlobError),
    #[error("CSV Error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("{path} has {found} column(s), expected a time column and at least one channel")]
    MissingChannels { path: PathBuf, found: usize },
    #[error("{0} has a header but no samples")]
    NoSamples(PathBuf),
    #[error("{path}, row {row}, column {column}: cannot parse '{value}' as a number")]
    InvalidSample {
        path: PathBuf,
        row: usize,
        column: usize,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to load {directory}: {source}")]
    Load {
        directory: PathBuf,
        source: LoadError,
    },
    #[error("Cannot build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
