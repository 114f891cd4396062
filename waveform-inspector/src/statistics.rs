use novo_common::Real;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatisticsError {
    #[error("Cannot summarise an empty sequence")]
    EmptyInput,
    #[error("A straight line fit needs at least two points, got {0}")]
    TooFewPoints(usize),
    #[error("A straight line fit needs at least two distinct abscissae")]
    DegenerateAbscissa,
}

/// Mean and spread of a feature sequence.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StatSummary {
    pub mean: Real,
    pub spread: Real,
}

impl Display for StatSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "µ = {}, σ = {}", self.mean, self.spread)
    }
}

/// Summarises a sequence as `(mean, spread)`.
///
/// The spread is `sqrt(Σ(x - mean)² / ((n + 1) n))`. Note the `(n + 1) n`
/// denominator: this is neither the population nor the sample variance, and
/// must not be replaced by either.
pub fn stats(values: &[Real]) -> Result<StatSummary, StatisticsError> {
    if values.is_empty() {
        return Err(StatisticsError::EmptyInput);
    }
    let count = values.len() as Real;
    let mean = values.iter().sum::<Real>() / count;
    let sum_of_squares: Real = values.iter().map(|x| (x - mean).powi(2)).sum();
    Ok(StatSummary {
        mean,
        spread: (sum_of_squares / ((count + 1.0) * count)).sqrt(),
    })
}

/// Straight line `y = slope * x + intercept`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: Real,
    pub intercept: Real,
}

impl Display for LinearFit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "y = {} x + {}", self.slope, self.intercept)
    }
}

/// Ordinary least squares fit of a straight line through `(x, y)` points.
pub fn linear_fit(points: &[(Real, Real)]) -> Result<LinearFit, StatisticsError> {
    if points.len() < 2 {
        return Err(StatisticsError::TooFewPoints(points.len()));
    }
    let count = points.len() as Real;
    let mean_x = points.iter().map(|(x, _)| x).sum::<Real>() / count;
    let mean_y = points.iter().map(|(_, y)| y).sum::<Real>() / count;

    let (covariance, variance) = points
        .iter()
        .fold((0.0, 0.0), |(covariance, variance), (x, y)| {
            (
                covariance + (x - mean_x) * (y - mean_y),
                variance + (x - mean_x).powi(2),
            )
        });
    if variance == 0.0 {
        return Err(StatisticsError::DegenerateAbscissa);
    }
    let slope = covariance / variance;
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}
