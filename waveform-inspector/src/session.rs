//! Line driven command loop over the output of the pipeline.
//!
//! At the top level a dataset is selected by its index, `DA` summarises the
//! crossing differences against position and `EXIT` ends the session. Once a
//! dataset is selected `r` describes a random waveform not yet shown, `s`
//! prints the summary of every feature and `e` returns to the top level.
use crate::{
    features::{ChannelFeatures, FeatureKind, crossing_difference},
    pipeline::{DatasetAnalysis, coincidence_fit, coincidence_view},
    statistics::stats,
    waveform::SourcedWaveform,
};
use rand::Rng;
use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};
use strum::{EnumString, IntoEnumIterator};
use tracing::{debug, info};

pub const INVALID_INPUT: &str = "Invalid input. Retry!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
enum TopLevelCommand {
    #[strum(serialize = "DA")]
    DataAnalysis,
    #[strum(serialize = "EXIT")]
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
enum DatasetCommand {
    #[strum(serialize = "r")]
    RandomWaveform,
    #[strum(serialize = "s")]
    Statistics,
    #[strum(serialize = "e")]
    Exit,
}

/// Whether the session should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
enum Selection {
    None,
    Dataset {
        index: usize,
        /// Waveforms not yet shown.
        remaining: Vec<usize>,
    },
}

pub struct Session<R> {
    analyses: Vec<DatasetAnalysis>,
    selection: Selection,
    rng: R,
}

impl<R: Rng> Session<R> {
    pub fn new(analyses: Vec<DatasetAnalysis>, rng: R) -> Self {
        Self {
            analyses,
            selection: Selection::None,
            rng,
        }
    }

    /// Index, into the pipeline output, of the selected dataset.
    pub fn selected(&self) -> Option<usize> {
        match self.selection {
            Selection::None => None,
            Selection::Dataset { index, .. } => Some(index),
        }
    }

    pub fn prompt(&self) -> String {
        match &self.selection {
            Selection::None => format!(
                "Select a dataset [0-{}], DA for data analysis or EXIT: ",
                self.analyses.len().saturating_sub(1)
            ),
            Selection::Dataset { index, .. } => format!(
                "Dataset {index}: [r]andom waveform, [s]tatistics or [e]xit: "
            ),
        }
    }

    /// Executes one line of input, writing any response to `out`.
    pub fn dispatch<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        debug!(line, "Dispatching command");
        match self.selection {
            Selection::None => self.dispatch_top_level(line, out),
            Selection::Dataset { .. } => self.dispatch_dataset(line, out),
        }
    }

    /// Prompts and dispatches until `EXIT` or the end of `input`.
    pub fn run<I: BufRead, W: Write>(&mut self, input: I, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self.prompt())?;
        out.flush()?;
        for line in input.lines() {
            if self.dispatch(&line?, out)? == Flow::Exit {
                return Ok(());
            }
            write!(out, "{}", self.prompt())?;
            out.flush()?;
        }
        writeln!(out)
    }

    fn dispatch_top_level<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        if let Ok(index) = line.parse::<usize>() {
            return match self.analyses.get(index) {
                Some(analysis) => {
                    info!(
                        index,
                        directory = %analysis.dataset.directory().display(),
                        "Dataset selected"
                    );
                    writeln!(
                        out,
                        "Selected {} ({} waveforms)",
                        analysis.dataset.directory().display(),
                        analysis.dataset.len()
                    )?;
                    self.selection = Selection::Dataset {
                        index,
                        remaining: (0..analysis.dataset.len()).collect(),
                    };
                    Ok(Flow::Continue)
                }
                None => {
                    writeln!(out, "{INVALID_INPUT}")?;
                    Ok(Flow::Continue)
                }
            };
        }
        match TopLevelCommand::from_str(line) {
            Ok(TopLevelCommand::DataAnalysis) => {
                write_data_analysis(&self.analyses, out)?;
                Ok(Flow::Continue)
            }
            Ok(TopLevelCommand::Exit) => Ok(Flow::Exit),
            Err(_) => {
                writeln!(out, "{INVALID_INPUT}")?;
                Ok(Flow::Continue)
            }
        }
    }

    fn dispatch_dataset<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        match DatasetCommand::from_str(line) {
            Ok(DatasetCommand::RandomWaveform) => self.write_random_waveform(out)?,
            Ok(DatasetCommand::Statistics) => self.write_selected_statistics(out)?,
            Ok(DatasetCommand::Exit) => self.selection = Selection::None,
            Err(_) => writeln!(out, "{INVALID_INPUT}")?,
        }
        Ok(Flow::Continue)
    }

    fn write_random_waveform<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Selection::Dataset { index, remaining } = &mut self.selection else {
            return Ok(());
        };
        if remaining.is_empty() {
            return writeln!(out, "Every waveform in this dataset has been shown");
        }
        let choice = self.rng.random_range(0..remaining.len());
        let pick = remaining.swap_remove(choice);
        match self
            .analyses
            .get(*index)
            .and_then(|analysis| analysis.dataset.get(pick))
        {
            Some(sourced) => write_waveform(sourced, out),
            None => Ok(()),
        }
    }

    fn write_selected_statistics<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.selected().and_then(|index| self.analyses.get(index)) {
            Some(analysis) => write_statistics(analysis, out),
            None => Ok(()),
        }
    }
}

/// Writes the summary of every feature sequence of one dataset, one per line.
pub fn write_statistics<W: Write>(analysis: &DatasetAnalysis, out: &mut W) -> io::Result<()> {
    for kind in FeatureKind::iter() {
        match stats(analysis.features.sequence(kind)) {
            Ok(summary) => writeln!(out, "{kind}: {summary}")?,
            Err(e) => writeln!(out, "{kind}: {e}")?,
        }
    }
    Ok(())
}

/// Writes the coincidence view and the straight line fitted through it.
pub fn write_data_analysis<W: Write>(analyses: &[DatasetAnalysis], out: &mut W) -> io::Result<()> {
    if analyses.len() < 2 {
        return writeln!(out, "Data analysis needs at least two datasets");
    }
    let points = match coincidence_view(analyses) {
        Ok(points) => points,
        Err(e) => return writeln!(out, "Data analysis failed: {e}"),
    };
    for point in &points {
        writeln!(out, "Position {}: {}", point.position, point.summary)?;
    }
    match coincidence_fit(&points) {
        Ok(fit) => writeln!(out, "Fit: {fit}"),
        Err(e) => writeln!(out, "Fit failed: {e}"),
    }
}

fn write_waveform<W: Write>(sourced: &SourcedWaveform, out: &mut W) -> io::Result<()> {
    let waveform = &sourced.waveform;
    writeln!(
        out,
        "{} ({} samples, {} channels)",
        sourced.source,
        waveform.num_samples(),
        waveform.num_channels()
    )?;
    for channel in waveform.channels() {
        let features = ChannelFeatures::extract(waveform.time(), &channel.values);
        writeln!(
            out,
            "  {}: {} = {}, {} = {}, {} = {}, {} = {}",
            channel.name,
            FeatureKind::CrossingTime,
            features.crossing_time,
            FeatureKind::RiseTime,
            features.rise_time,
            FeatureKind::Amplitude,
            features.peak_amplitude,
            FeatureKind::PulseWidth,
            features.pulse_width,
        )?;
    }
    writeln!(
        out,
        "  {} = {}",
        FeatureKind::CrossingDifference,
        crossing_difference(waveform)
    )
}
