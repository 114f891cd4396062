use assert_approx_eq::assert_approx_eq;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{
    path::{Path, PathBuf},
    thread,
    time::Duration,
};
use tempfile::TempDir;
use waveform_inspector::{
    CsvDirectoryLoader, Dataset, DatasetPipeline, LoadError, LoadErrorPolicy, PipelineError,
    PipelineInput, PipelineOptions, WaveformLoader, coincidence_fit, coincidence_view, stats,
};
use waveform_simulator::{
    DatasetPlan, PulseConfig, RandomDistribution, WaveformConfig, generate_datasets,
};

fn constant(value: f64) -> RandomDistribution {
    RandomDistribution::Constant { value }
}

/// Two noiseless channels with identical Gaussian pulses.
fn gaussian_config(sample_time: f64, num_samples: usize) -> WaveformConfig {
    let pulse = PulseConfig {
        peak_time: constant(10.0),
        sd: constant(1.0),
        height: constant(100.0),
    };
    WaveformConfig {
        sample_time,
        num_samples,
        time_offset: 0.0,
        noise: None,
        channels: vec![pulse.clone(), pulse],
    }
}

fn write_datasets(
    dir: &Path,
    config: &WaveformConfig,
    num_datasets: usize,
    waveforms_per_dataset: usize,
    delay_step: f64,
) -> Vec<PathBuf> {
    let plan = DatasetPlan {
        num_datasets,
        waveforms_per_dataset,
        delay_step,
    };
    generate_datasets(dir, config, &plan, &mut StdRng::seed_from_u64(11))
        .expect("datasets should be written")
}

/// Sleeps for a random time before delegating, so tasks finish out of order.
struct DelayedLoader;

impl WaveformLoader for DelayedLoader {
    fn load(&self, directory: &Path) -> Result<Dataset, LoadError> {
        thread::sleep(Duration::from_millis(rand::rng().random_range(0..40)));
        CsvDirectoryLoader.load(directory)
    }
}

#[test]
fn three_directories_of_two_files() {
    let dir = TempDir::new().expect("scratch directory");
    let directories = write_datasets(dir.path(), &WaveformConfig::default(), 3, 2, 0.0);

    let input = PipelineInput::new(directories.clone(), None).expect("input is valid");
    let analyses = DatasetPipeline::new(CsvDirectoryLoader, PipelineOptions::default())
        .run(&input)
        .expect("pipeline should succeed");

    assert_eq!(analyses.len(), 3);
    for (analysis, directory) in analyses.iter().zip(&directories) {
        assert_eq!(analysis.dataset.directory(), directory.as_path());
        assert_eq!(analysis.dataset.len(), 2);
        let features = &analysis.features;
        assert_eq!(features.crossing_times().len(), 4);
        assert_eq!(features.rise_times().len(), 4);
        assert_eq!(features.amplitudes().len(), 4);
        assert_eq!(features.pulse_widths().len(), 4);
        assert_eq!(features.crossing_differences().len(), 2);
    }
}

#[test]
fn output_order_follows_input_order_under_random_delays() {
    let dir = TempDir::new().expect("scratch directory");
    // Dataset k delays its second channel by 0.5 k, a whole number of samples
    let written = write_datasets(dir.path(), &gaussian_config(0.1, 200), 6, 2, 0.5);
    let directories: Vec<_> = written.iter().rev().cloned().collect();
    let positions: Vec<f64> = (0..6).map(|i| 100.0 + i as f64).collect();

    let input =
        PipelineInput::new(directories.clone(), Some(positions.clone())).expect("input is valid");
    let pipeline = DatasetPipeline::new(
        DelayedLoader,
        PipelineOptions {
            workers: Some(4),
            ..Default::default()
        },
    );
    for _ in 0..3 {
        let analyses = pipeline.run(&input).expect("pipeline should succeed");
        let order: Vec<_> = analyses
            .iter()
            .map(|a| (a.index, a.position, a.dataset.directory().to_owned()))
            .collect();
        let expected: Vec<_> = directories
            .iter()
            .zip(&positions)
            .enumerate()
            .map(|(index, (directory, &position))| (index, position, directory.clone()))
            .collect();
        assert_eq!(order, expected);

        // Features must belong to the dataset they are reported with
        for analysis in &analyses {
            let k = written
                .iter()
                .position(|directory| directory == analysis.dataset.directory())
                .expect("directory was written");
            assert_eq!(analysis.features.crossing_differences().len(), 2);
            for &difference in analysis.features.crossing_differences() {
                assert_approx_eq!(difference, -0.5 * k as f64, 1e-6);
            }
        }
    }
}

#[test]
fn load_error_policies() {
    let dir = TempDir::new().expect("scratch directory");
    let mut directories = write_datasets(dir.path(), &gaussian_config(0.1, 200), 2, 1, 0.0);
    let broken = dir.path().join("broken");
    std::fs::create_dir(&broken).expect("directory is created");
    std::fs::write(broken.join("a.csv"), "Time,Channel 1\n0,not-a-number\n")
        .expect("file is written");
    directories.insert(1, broken.clone());

    let input = PipelineInput::new(directories.clone(), Some(vec![0.0, 5.0, 10.0]))
        .expect("input is valid");

    let result = DatasetPipeline::new(CsvDirectoryLoader, PipelineOptions::default()).run(&input);
    assert!(matches!(
        result,
        Err(PipelineError::Load {
            ref directory,
            source: LoadError::InvalidSample { .. },
        }) if *directory == broken
    ));

    let analyses = DatasetPipeline::new(
        CsvDirectoryLoader,
        PipelineOptions {
            on_load_error: LoadErrorPolicy::Skip,
            workers: None,
        },
    )
    .run(&input)
    .expect("failing directory is skipped");
    let kept: Vec<_> = analyses.iter().map(|a| (a.index, a.position)).collect();
    assert_eq!(kept, vec![(0, 0.0), (2, 10.0)]);
}

#[test]
fn gaussian_features_match_analytic_values() {
    let dir = TempDir::new().expect("scratch directory");
    // 0.01 sampling of a unit width pulse, each dataset delays the second
    // channel by a further 0.5
    let directories = write_datasets(dir.path(), &gaussian_config(0.01, 2001), 3, 2, 0.5);

    let input = PipelineInput::new(directories, None).expect("input is valid");
    let analyses = DatasetPipeline::new(CsvDirectoryLoader, PipelineOptions::default())
        .run(&input)
        .expect("pipeline should succeed");

    let leading_edge = 10.0 - (2.0 * 10.0_f64.ln()).sqrt();
    let rise_time = (2.0 * 10.0_f64.ln()).sqrt() - (2.0 * (10.0_f64 / 9.0).ln()).sqrt();
    for (k, analysis) in analyses.iter().enumerate() {
        let features = &analysis.features;
        for (i, &rise) in features.rise_times().iter().enumerate() {
            assert_approx_eq!(rise, rise_time, 1e-3);
            let delay = if i % 2 == 1 { 0.5 * k as f64 } else { 0.0 };
            assert_approx_eq!(features.crossing_times()[i], leading_edge + delay, 1e-3);
        }
        for &amplitude in features.amplitudes() {
            assert_approx_eq!(amplitude, 100.0, 1e-6);
        }
        // A unipolar pulse has no later crossing than its leading edge
        for &width in features.pulse_widths() {
            assert_approx_eq!(width, 0.0, 1e-9);
        }
        let summary = stats(features.crossing_differences()).expect("dataset is not empty");
        assert_approx_eq!(summary.mean, -0.5 * k as f64, 1e-3);
        assert_approx_eq!(summary.spread, 0.0, 1e-9);
    }

    let points = coincidence_view(&analyses).expect("datasets are not empty");
    let fit = coincidence_fit(&points).expect("positions are distinct");
    assert_approx_eq!(fit.slope, -0.5, 1e-3);
    assert_approx_eq!(fit.intercept, 0.0, 1e-3);
}
