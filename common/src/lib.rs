//! Types and helpers shared by the waveform inspector and the waveform simulator.
pub mod tracer;

pub use tracer::{LoggingOpts, TracerEngine, TracerError};

/// Floating point type used for samples and every derived feature.
pub type Real = f64;

/// A sample time, in the units of the capture's time column (typically ns).
pub type Time = Real;

/// A sample value, in the units of the capture's channel columns (typically mV).
pub type Amplitude = Real;

/// Externally supplied tag of a dataset, e.g. the source position in cm.
pub type Position = Real;

/// Header of the first column of a waveform file.
pub const TIME_COLUMN_LABEL: &str = "Time";

/// Header of a channel column, channels are numbered from one.
pub fn channel_label(channel: usize) -> String {
    format!("Channel {channel}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_labels() {
        assert_eq!(channel_label(1), "Channel 1");
        assert_eq!(channel_label(12), "Channel 12");
    }
}
