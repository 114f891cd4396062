use novo_common::{Amplitude, Time};
use std::path::{Path, PathBuf};

/// The samples of one named channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTrace {
    pub name: String,
    pub values: Vec<Amplitude>,
}

impl ChannelTrace {
    pub fn new(name: impl Into<String>, values: Vec<Amplitude>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A single capture: one time axis shared by one or more channels.
///
/// Channel lengths are not checked against the time axis here. A mismatched
/// channel is still carried, and every crossing computed on it is undefined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Waveform {
    time: Vec<Time>,
    channels: Vec<ChannelTrace>,
}

impl Waveform {
    pub fn new(time: Vec<Time>, channels: Vec<ChannelTrace>) -> Self {
        Self { time, channels }
    }

    pub fn time(&self) -> &[Time] {
        &self.time
    }

    pub fn channels(&self) -> &[ChannelTrace] {
        &self.channels
    }

    pub fn num_samples(&self) -> usize {
        self.time.len()
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// True if every channel has exactly one value per time sample.
    pub fn is_consistent(&self) -> bool {
        self.channels
            .iter()
            .all(|channel| channel.values.len() == self.time.len())
    }
}

/// A waveform together with the name of the file it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedWaveform {
    pub source: String,
    pub waveform: Waveform,
}

/// All waveforms loaded from one directory, in loader order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    directory: PathBuf,
    waveforms: Vec<SourcedWaveform>,
}

impl Dataset {
    pub fn new(directory: impl Into<PathBuf>, waveforms: Vec<SourcedWaveform>) -> Self {
        Self {
            directory: directory.into(),
            waveforms,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn waveforms(&self) -> &[SourcedWaveform] {
        &self.waveforms
    }

    pub fn get(&self, index: usize) -> Option<&SourcedWaveform> {
        self.waveforms.get(index)
    }

    pub fn len(&self) -> usize {
        self.waveforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waveforms.is_empty()
    }
}
