//! Per-channel and per-waveform pulse features, and their collection over a dataset.
use crate::{
    crossing::{
        LEADING_EDGE_FRACTION, RISE_COMPLETE_FRACTION, ScanDirection, crossing_time,
        peak_magnitude,
    },
    waveform::{Dataset, Waveform},
};
use novo_common::{Amplitude, Real, Time};
use strum::{Display, EnumIter};
use tracing::warn;

/// Time of the first 10% crossing, `0` if it is undefined.
pub fn leading_edge_time(time: &[Time], values: &[Amplitude]) -> Time {
    crossing_time(time, values, LEADING_EDGE_FRACTION, ScanDirection::Forward).or_sentinel()
}

/// Time from the first 10% crossing to the first 90% crossing.
pub fn rise_time(time: &[Time], values: &[Amplitude]) -> Time {
    crossing_time(time, values, RISE_COMPLETE_FRACTION, ScanDirection::Forward).or_sentinel()
        - leading_edge_time(time, values)
}

/// Time between the first and the last 10% crossings.
pub fn pulse_width(time: &[Time], values: &[Amplitude]) -> Time {
    let last =
        crossing_time(time, values, LEADING_EDGE_FRACTION, ScanDirection::Reverse).or_sentinel();
    (last - leading_edge_time(time, values)).abs()
}

pub fn peak_amplitude(values: &[Amplitude]) -> Amplitude {
    peak_magnitude(values)
}

/// Leading edge time of the first channel minus that of the second.
///
/// Waveforms with fewer than two channels give `0`. Only the first two
/// channels of a waveform with more are used.
pub fn crossing_difference(waveform: &Waveform) -> Time {
    match waveform.channels() {
        [first, second, rest @ ..] => {
            if !rest.is_empty() {
                warn!(
                    num_channels = waveform.num_channels(),
                    "Waveform has more than two channels, only the first two are compared"
                );
            }
            leading_edge_time(waveform.time(), &first.values)
                - leading_edge_time(waveform.time(), &second.values)
        }
        _ => 0.0,
    }
}

/// The features of a single channel.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ChannelFeatures {
    pub crossing_time: Time,
    pub rise_time: Time,
    pub peak_amplitude: Amplitude,
    pub pulse_width: Time,
}

impl ChannelFeatures {
    pub fn extract(time: &[Time], values: &[Amplitude]) -> Self {
        Self {
            crossing_time: leading_edge_time(time, values),
            rise_time: rise_time(time, values),
            peak_amplitude: peak_amplitude(values),
            pulse_width: pulse_width(time, values),
        }
    }
}

/// Selects one of the sequences of a [FeatureSet].
/// Variants are listed in the order in which summaries are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum FeatureKind {
    #[strum(to_string = "Differential 10% of maximum amplitude timestamp")]
    CrossingDifference,
    #[strum(to_string = "10% of maximum amplitude timestamp")]
    CrossingTime,
    #[strum(to_string = "Rise time")]
    RiseTime,
    #[strum(to_string = "Amplitude")]
    Amplitude,
    #[strum(to_string = "Pulse width")]
    PulseWidth,
}

/// The feature sequences of one dataset.
///
/// Per-channel sequences hold one entry per channel of every waveform, in
/// waveform order then channel order. `crossing_differences` holds one entry
/// per waveform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    crossing_times: Vec<Time>,
    crossing_differences: Vec<Time>,
    rise_times: Vec<Time>,
    amplitudes: Vec<Amplitude>,
    pulse_widths: Vec<Time>,
}

impl FeatureSet {
    #[tracing::instrument(skip_all, fields(
        directory = %dataset.directory().display(),
        num_waveforms = dataset.len(),
    ))]
    pub fn extract(dataset: &Dataset) -> Self {
        let mut features = Self::default();
        for sourced in dataset.waveforms() {
            features.push_waveform(&sourced.waveform);
        }
        features
    }

    fn push_waveform(&mut self, waveform: &Waveform) {
        if !waveform.is_consistent() {
            warn!(
                num_samples = waveform.num_samples(),
                "Channel lengths differ from the time axis, their crossings are undefined"
            );
        }
        for channel in waveform.channels() {
            let channel = ChannelFeatures::extract(waveform.time(), &channel.values);
            self.crossing_times.push(channel.crossing_time);
            self.rise_times.push(channel.rise_time);
            self.amplitudes.push(channel.peak_amplitude);
            self.pulse_widths.push(channel.pulse_width);
        }
        self.crossing_differences.push(crossing_difference(waveform));
    }

    pub fn sequence(&self, kind: FeatureKind) -> &[Real] {
        match kind {
            FeatureKind::CrossingDifference => &self.crossing_differences,
            FeatureKind::CrossingTime => &self.crossing_times,
            FeatureKind::RiseTime => &self.rise_times,
            FeatureKind::Amplitude => &self.amplitudes,
            FeatureKind::PulseWidth => &self.pulse_widths,
        }
    }

    pub fn crossing_times(&self) -> &[Time] {
        &self.crossing_times
    }

    pub fn crossing_differences(&self) -> &[Time] {
        &self.crossing_differences
    }

    pub fn rise_times(&self) -> &[Time] {
        &self.rise_times
    }

    pub fn amplitudes(&self) -> &[Amplitude] {
        &self.amplitudes
    }

    pub fn pulse_widths(&self) -> &[Time] {
        &self.pulse_widths
    }
}
