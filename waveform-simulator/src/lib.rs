//! Writes directories of synthetic two-channel pulse waveforms in the CSV
//! layout read by the inspector.
//!
//! The output stands in for DRS4 captures converted to CSV by the external
//! parser.
pub mod config;
pub mod generator;
pub mod writer;

use std::path::PathBuf;
use thiserror::Error;

pub use config::{NoiseConfig, PulseConfig, RandomDistribution, WaveformConfig};
pub use generator::{GaussianPulse, GeneratedWaveform, generate_waveform};
pub use writer::{DatasetPlan, generate_datasets, write_waveform_csv};

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("IO Error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV Error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid Normal Distribution: {0}")]
    Normal(#[from] rand_distr::NormalError),
    #[error("Invalid Uniform Distribution: {0}")]
    Uniform(#[from] rand::distr::uniform::Error),
    #[error("Invalid Configuration: {0}")]
    InvalidConfig(String),
}
