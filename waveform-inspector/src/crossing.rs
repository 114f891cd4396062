//! Linear-interpolation threshold crossing on digitised samples.
//!
//! A pair of adjacent samples `(v0, v1)` crosses the threshold `amp` if the
//! signal rises through `+amp` (`v0 <= amp < v1`) or falls through `-amp`
//! (`v1 < -amp <= v0`). The test is the same whichever way the samples are
//! scanned, so a reverse scan reports the last such pair in time, and the
//! trailing edge of a unipolar pulse is never a crossing.
use novo_common::{Amplitude, Real, Time};

/// Fraction of the peak used for the leading edge timestamp.
pub const LEADING_EDGE_FRACTION: Real = 0.1;

/// Fraction of the peak at which the rise is considered complete.
pub const RISE_COMPLETE_FRACTION: Real = 0.9;

/// The value reported in place of an undefined crossing.
pub const UNDEFINED_CROSSING_SENTINEL: Time = 0.0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// From the first sample to the last.
    #[default]
    Forward,
    /// From the last sample to the first.
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum UndefinedCrossing {
    #[strum(to_string = "time and value sequences have different lengths")]
    LengthMismatch,
    #[strum(to_string = "threshold is never crossed")]
    NotCrossed,
}

/// Result of a crossing search.
///
/// Keeps a genuine crossing at `t = 0` apart from an undefined one, while
/// [Crossing::or_sentinel] gives the historical `0` for both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crossing {
    At(Time),
    Undefined(UndefinedCrossing),
}

impl Crossing {
    pub fn time(self) -> Option<Time> {
        match self {
            Crossing::At(time) => Some(time),
            Crossing::Undefined(_) => None,
        }
    }

    pub fn or_sentinel(self) -> Time {
        self.time().unwrap_or(UNDEFINED_CROSSING_SENTINEL)
    }
}

/// Largest absolute value of the samples, `0` if there are none.
pub fn peak_magnitude(values: &[Amplitude]) -> Amplitude {
    values.iter().map(|value| value.abs()).fold(0.0, Real::max)
}

type SamplePair = ((Time, Amplitude), (Time, Amplitude));

fn interpolate(target: Amplitude, ((t0, v0), (t1, v1)): SamplePair) -> Time {
    (target - v0) * (t1 - t0) / (v1 - v0) + t0
}

fn pair_crossing(amplitude: Amplitude, pair: SamplePair) -> Option<Time> {
    let ((_, v0), (_, v1)) = pair;
    if v0 <= amplitude && amplitude < v1 {
        Some(interpolate(amplitude, pair))
    } else if v1 < -amplitude && -amplitude <= v0 {
        Some(interpolate(-amplitude, pair))
    } else {
        None
    }
}

fn first_crossing<I>(mut pairs: I, amplitude: Amplitude) -> Option<Time>
where
    I: Iterator<Item = SamplePair>,
{
    pairs.find_map(|pair| pair_crossing(amplitude, pair))
}

/// Finds the first time, in scan order, at which the signal crosses
/// `relative_threshold` times its absolute peak.
/// # Parameters
/// - time: sample times.
/// - values: sample values, one per time.
/// - relative_threshold: fraction of the absolute peak, in `(0, 1]`.
/// - direction: the order in which sample pairs are tested.
/// # Return
/// The linearly interpolated crossing time, or the reason it is undefined.
pub fn crossing_time(
    time: &[Time],
    values: &[Amplitude],
    relative_threshold: Real,
    direction: ScanDirection,
) -> Crossing {
    if time.len() != values.len() {
        return Crossing::Undefined(UndefinedCrossing::LengthMismatch);
    }
    let amplitude = relative_threshold * peak_magnitude(values);

    // Each item holds the earlier sample first, whichever way the pairs are walked.
    let pairs = time
        .windows(2)
        .zip(values.windows(2))
        .filter_map(|window| match window {
            (&[t0, t1], &[v0, v1]) => Some(((t0, v0), (t1, v1))),
            _ => None,
        });

    let found = match direction {
        ScanDirection::Forward => first_crossing(pairs, amplitude),
        ScanDirection::Reverse => first_crossing(pairs.rev(), amplitude),
    };
    found.map_or(
        Crossing::Undefined(UndefinedCrossing::NotCrossed),
        Crossing::At,
    )
}
