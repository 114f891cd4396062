use crate::{
    SimulatorError,
    config::WaveformConfig,
    generator::{GeneratedWaveform, generate_waveform},
};
use csv::{QuoteStyle, WriterBuilder};
use novo_common::{TIME_COLUMN_LABEL, Time, channel_label};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How many directories to write and what goes in each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetPlan {
    pub num_datasets: usize,
    pub waveforms_per_dataset: usize,
    /// Extra delay of the later channels, multiplied by the dataset index.
    pub delay_step: Time,
}

pub fn dataset_directory_name(dataset: usize) -> String {
    format!("dataset_{dataset}")
}

/// Zero padded so that path order is generation order.
pub fn waveform_file_name(waveform: usize) -> String {
    format!("waveform_{waveform:04}.csv")
}

/// Writes `waveform` with a quoted header row `"Time","Channel 1",...`.
pub fn write_waveform_csv(path: &Path, waveform: &GeneratedWaveform) -> Result<(), SimulatorError> {
    let csv_error = |source| SimulatorError::Csv {
        path: path.to_owned(),
        source,
    };
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_path(path)
        .map_err(csv_error)?;

    let header = std::iter::once(TIME_COLUMN_LABEL.to_owned())
        .chain((1..=waveform.channels.len()).map(channel_label));
    writer.write_record(header).map_err(csv_error)?;

    for (index, time) in waveform.time.iter().enumerate() {
        let row = std::iter::once(time.to_string()).chain(
            waveform
                .channels
                .iter()
                .map(|channel| channel.get(index).map(f64::to_string).unwrap_or_default()),
        );
        writer.write_record(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| SimulatorError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Writes `plan.num_datasets` directories of generated waveforms under `output`.
/// # Return
/// The dataset directories, in order.
/// # Error Modes
/// - Emits [SimulatorError::Io] if a directory cannot be created.
/// - Propagates generation and [csv] errors.
#[tracing::instrument(skip_all, fields(
    output = %output.display(),
    num_datasets = plan.num_datasets,
))]
pub fn generate_datasets<R: Rng + ?Sized>(
    output: &Path,
    config: &WaveformConfig,
    plan: &DatasetPlan,
    rng: &mut R,
) -> Result<Vec<PathBuf>, SimulatorError> {
    config.validate()?;
    (0..plan.num_datasets)
        .map(|dataset| {
            let directory = output.join(dataset_directory_name(dataset));
            std::fs::create_dir_all(&directory).map_err(|source| SimulatorError::Io {
                path: directory.clone(),
                source,
            })?;
            let delay = dataset as Time * plan.delay_step;
            for index in 0..plan.waveforms_per_dataset {
                let waveform = generate_waveform(config, delay, rng)?;
                let path = directory.join(waveform_file_name(index));
                write_waveform_csv(&path, &waveform)?;
                debug!(path = %path.display(), "Waveform written");
            }
            info!(
                directory = %directory.display(),
                num_waveforms = plan.waveforms_per_dataset,
                "Dataset written"
            );
            Ok(directory)
        })
        .collect()
}
