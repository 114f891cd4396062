use crate::error::ConfigError;
use clap::ValueEnum;
use novo_common::Position;
use std::str::FromStr;

/// Position tags given on the command line as `(a,b,c)`.
///
/// The parentheses are optional and empty entries are ignored, so `(1,2,)`
/// and `1,2` both give `[1, 2]`.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct PositionVector(pub Vec<Position>);

impl FromStr for PositionVector {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                Position::from_str(entry).map_err(|e| ConfigError::InvalidPosition {
                    input: s.to_owned(),
                    reason: format!("'{entry}': {e}"),
                })
            })
            .collect::<Result<_, _>>()
            .map(PositionVector)
    }
}

impl From<PositionVector> for Vec<Position> {
    fn from(value: PositionVector) -> Self {
        value.0
    }
}

/// What the pipeline does when a directory fails to load.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
pub enum LoadErrorPolicy {
    /// Fail the run with the first failing directory.
    #[default]
    #[strum(to_string = "abort")]
    Abort,
    /// Log a warning and drop the directory together with its position.
    #[strum(to_string = "skip")]
    Skip,
}
