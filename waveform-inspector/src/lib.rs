//! Timing and amplitude features of digitised detector pulses.
//!
//! Directories of waveform files are loaded and analysed in parallel by a
//! [DatasetPipeline]. Each [DatasetAnalysis] holds the loaded [Dataset] and
//! its [FeatureSet], which a [Session] summarises on request.
//!
//! Captures from the DRS4 digitiser are stored in its binary format and
//! converted to one CSV file per waveform by a separate parser, which is not
//! part of this workspace. `waveform-simulator` writes the same CSV layout
//! for testing without hardware.
pub mod crossing;
pub mod error;
pub mod features;
pub mod loader;
pub mod parameters;
pub mod pipeline;
pub mod session;
pub mod statistics;
pub mod waveform;

pub use crossing::{Crossing, ScanDirection, UndefinedCrossing, crossing_time};
pub use error::{ConfigError, LoadError, PipelineError, StatisticsError};
pub use features::{ChannelFeatures, FeatureKind, FeatureSet};
pub use loader::{CsvDirectoryLoader, WaveformLoader};
pub use parameters::{LoadErrorPolicy, PositionVector};
pub use pipeline::{
    CoincidencePoint, DatasetAnalysis, DatasetPipeline, PipelineInput, PipelineOptions,
    coincidence_fit, coincidence_view,
};
pub use session::{Flow, Session};
pub use statistics::{LinearFit, StatSummary, linear_fit, stats};
pub use waveform::{ChannelTrace, Dataset, SourcedWaveform, Waveform};
