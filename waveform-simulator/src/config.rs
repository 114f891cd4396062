use crate::SimulatorError;
use novo_common::{Amplitude, Real, Time};
use rand::{Rng, distr::Uniform};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", tag = "random-type")]
pub enum RandomDistribution {
    Constant { value: Real },
    Uniform { min: Real, max: Real },
    Normal { mean: Real, sd: Real },
}

impl RandomDistribution {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Real, SimulatorError> {
        match *self {
            Self::Constant { value } => Ok(value),
            Self::Uniform { min, max } => Ok(Uniform::new_inclusive(min, max)?.sample(rng)),
            Self::Normal { mean, sd } => {
                Ok(Normal::new(mean, check_sd("normal sd", sd)?)?.sample(rng))
            }
        }
    }
}

/// `Normal::new` accepts a negative standard deviation, so it is refused here.
pub(crate) fn check_sd(name: &str, sd: Real) -> Result<Real, SimulatorError> {
    if sd.is_nan() || sd < 0.0 {
        return Err(SimulatorError::InvalidConfig(format!(
            "{name} must not be negative, got {sd}"
        )));
    }
    Ok(sd)
}

/// A Gaussian pulse `height * exp(-(t - peak_time)² / (2 sd²))`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PulseConfig {
    pub peak_time: RandomDistribution,
    pub sd: RandomDistribution,
    pub height: RandomDistribution,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct NoiseConfig {
    /// Standard deviation of the noise added to every sample.
    pub sd: Amplitude,
}

/// Shape of every waveform written by the simulator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WaveformConfig {
    pub sample_time: Time,
    pub num_samples: usize,
    #[serde(default)]
    pub time_offset: Time,
    #[serde(default)]
    pub noise: Option<NoiseConfig>,
    /// One pulse per channel.
    pub channels: Vec<PulseConfig>,
}

impl Default for WaveformConfig {
    /// Two channels sampled every 0.2 time units, the second pulse two units
    /// behind the first.
    fn default() -> Self {
        let pulse = |peak_time| PulseConfig {
            peak_time: RandomDistribution::Normal {
                mean: peak_time,
                sd: 0.5,
            },
            sd: RandomDistribution::Constant { value: 4.0 },
            height: RandomDistribution::Uniform {
                min: 100.0,
                max: 400.0,
            },
        };
        Self {
            sample_time: 0.2,
            num_samples: 1000,
            time_offset: 0.0,
            noise: Some(NoiseConfig { sd: 2.0 }),
            channels: vec![pulse(80.0), pulse(82.0)],
        }
    }
}

impl WaveformConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, SimulatorError> {
        let file = File::open(path).map_err(|source| SimulatorError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimulatorError> {
        if self.sample_time.is_nan() || self.sample_time <= 0.0 {
            return Err(SimulatorError::InvalidConfig(format!(
                "sample-time must be positive, got {}",
                self.sample_time
            )));
        }
        if self.num_samples < 2 {
            return Err(SimulatorError::InvalidConfig(format!(
                "num-samples must be at least 2, got {}",
                self.num_samples
            )));
        }
        if self.channels.is_empty() {
            return Err(SimulatorError::InvalidConfig(
                "at least one channel is required".to_owned(),
            ));
        }
        if let Some(noise) = &self.noise {
            check_sd("noise sd", noise.sd)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    const JSON_INPUT: &str = r#"
    {
        "sample-time": 0.5,
        "num-samples": 200,
        "channels": [
            {
                "peak-time": { "random-type": "constant", "value": 30 },
                "sd": { "random-type": "uniform", "min": 2, "max": 3 },
                "height": { "random-type": "normal", "mean": 100, "sd": 5 }
            }
        ]
    }
    "#;

    #[test]
    fn parse_json() {
        let config: WaveformConfig = serde_json::from_str(JSON_INPUT).expect("valid config");
        assert_eq!(config.sample_time, 0.5);
        assert_eq!(config.num_samples, 200);
        assert_eq!(config.time_offset, 0.0);
        assert_eq!(config.noise, None);
        assert_eq!(
            config.channels[0].peak_time,
            RandomDistribution::Constant { value: 30.0 }
        );
        assert_eq!(
            config.channels[0].sd,
            RandomDistribution::Uniform { min: 2.0, max: 3.0 }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(WaveformConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_configs() {
        let mut config = WaveformConfig::default();
        config.sample_time = 0.0;
        assert!(matches!(config.validate(), Err(SimulatorError::InvalidConfig(_))));

        let mut config = WaveformConfig::default();
        config.num_samples = 1;
        assert!(matches!(config.validate(), Err(SimulatorError::InvalidConfig(_))));

        let mut config = WaveformConfig::default();
        config.channels.clear();
        assert!(matches!(config.validate(), Err(SimulatorError::InvalidConfig(_))));
    }

    #[test]
    fn negative_noise_is_rejected() {
        let mut config = WaveformConfig::default();
        config.noise = Some(NoiseConfig { sd: -2.0 });
        assert!(matches!(config.validate(), Err(SimulatorError::InvalidConfig(_))));

        config.noise = Some(NoiseConfig { sd: Real::NAN });
        assert!(matches!(config.validate(), Err(SimulatorError::InvalidConfig(_))));

        config.noise = Some(NoiseConfig { sd: 0.0 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sample_distributions() {
        let mut rng = StdRng::seed_from_u64(1);
        let constant = RandomDistribution::Constant { value: 3.0 };
        assert_eq!(constant.sample(&mut rng).expect("constant"), 3.0);

        let uniform = RandomDistribution::Uniform { min: 1.0, max: 2.0 };
        for _ in 0..100 {
            let value = uniform.sample(&mut rng).expect("valid range");
            assert!((1.0..=2.0).contains(&value));
        }

        let degenerate = RandomDistribution::Uniform { min: 5.0, max: 5.0 };
        assert_eq!(degenerate.sample(&mut rng).expect("single point"), 5.0);
    }

    #[test]
    fn invalid_distributions() {
        let mut rng = StdRng::seed_from_u64(1);
        let uniform = RandomDistribution::Uniform { min: 2.0, max: 1.0 };
        assert!(matches!(uniform.sample(&mut rng), Err(SimulatorError::Uniform(_))));
        let normal = RandomDistribution::Normal { mean: 0.0, sd: -1.0 };
        assert!(matches!(normal.sample(&mut rng), Err(SimulatorError::InvalidConfig(_))));
        let normal = RandomDistribution::Normal { mean: 0.0, sd: Real::NAN };
        assert!(matches!(normal.sample(&mut rng), Err(SimulatorError::InvalidConfig(_))));
        let normal = RandomDistribution::Normal { mean: 0.0, sd: Real::INFINITY };
        assert!(matches!(normal.sample(&mut rng), Err(SimulatorError::Normal(_))));
        let point = RandomDistribution::Normal { mean: 7.0, sd: 0.0 };
        assert_eq!(point.sample(&mut rng).expect("zero spread"), 7.0);
    }
}
