//! Sampled Gaussian pulses with optional Gaussian noise.
use crate::{
    SimulatorError,
    config::{PulseConfig, WaveformConfig, check_sd},
};
use novo_common::{Amplitude, Time};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::trace;

/// A waveform as written to disk: one time axis and one value column per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedWaveform {
    pub time: Vec<Time>,
    pub channels: Vec<Vec<Amplitude>>,
}

/// The parameters of one pulse, drawn from a [PulseConfig].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianPulse {
    pub peak_time: Time,
    pub sd: Time,
    pub height: Amplitude,
}

impl GaussianPulse {
    pub fn sample<R: Rng + ?Sized>(
        config: &PulseConfig,
        rng: &mut R,
    ) -> Result<Self, SimulatorError> {
        let pulse = Self {
            peak_time: config.peak_time.sample(rng)?,
            sd: config.sd.sample(rng)?,
            height: config.height.sample(rng)?,
        };
        if pulse.sd <= 0.0 {
            return Err(SimulatorError::InvalidConfig(format!(
                "pulse sd must be positive, sampled {}",
                pulse.sd
            )));
        }
        Ok(pulse)
    }

    pub fn value_at(&self, time: Time) -> Amplitude {
        self.height * f64::exp(-f64::powi((time - self.peak_time) / self.sd, 2) / 2.0)
    }
}

/// Generates one waveform.
/// # Parameters
/// - config: the shape of the waveform.
/// - delay: added to the peak time of every channel but the first.
/// - rng: the source of every random draw.
pub fn generate_waveform<R: Rng + ?Sized>(
    config: &WaveformConfig,
    delay: Time,
    rng: &mut R,
) -> Result<GeneratedWaveform, SimulatorError> {
    let time: Vec<Time> = (0..config.num_samples)
        .map(|i| config.time_offset + i as Time * config.sample_time)
        .collect();
    let noise = match &config.noise {
        Some(noise) => Some(Normal::new(0.0, check_sd("noise sd", noise.sd)?)?),
        None => None,
    };

    let channels: Vec<Vec<Amplitude>> = config
        .channels
        .iter()
        .enumerate()
        .map(|(index, pulse)| {
            let mut pulse = GaussianPulse::sample(pulse, rng)?;
            if index > 0 {
                pulse.peak_time += delay;
            }
            trace!(channel = index, ?pulse, "Sampled pulse");
            Ok(time
                .iter()
                .map(|&t| {
                    let value = pulse.value_at(t);
                    match &noise {
                        Some(noise) => value + noise.sample(rng),
                        None => value,
                    }
                })
                .collect::<Vec<_>>())
        })
        .collect::<Result<_, SimulatorError>>()?;
    Ok(GeneratedWaveform { time, channels })
}
