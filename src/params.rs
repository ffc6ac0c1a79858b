use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Synthesis algorithm run by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    /// Collectively optimal strategy for the grand coalition.
    #[default]
    Collective,
    /// Strategy profile forming a Nash equilibrium.
    NashEquilibrium,
    /// Strategy profile forming an epsilon-Nash equilibrium with minimal epsilon.
    EpsilonNashEquilibrium,
}

impl Algorithm {
    /// Numeric code used on the wire.
    pub fn code(self) -> u8 {
        match self {
            Self::Collective => 0,
            Self::NashEquilibrium => 1,
            Self::EpsilonNashEquilibrium => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Collective => "COLLECTIVE",
            Self::NashEquilibrium => "NASH_EQUILIBRIUM",
            Self::EpsilonNashEquilibrium => "EPSILON_NASH_EQUILIBRIUM",
        }
    }

    pub fn uses_iterations(self) -> bool {
        self == Self::EpsilonNashEquilibrium
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ParamError;

    /// Accepts the numeric wire code or the symbolic name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" | "COLLECTIVE" => Ok(Self::Collective),
            "1" | "NASH_EQUILIBRIUM" => Ok(Self::NashEquilibrium),
            "2" | "EPSILON_NASH_EQUILIBRIUM" => Ok(Self::EpsilonNashEquilibrium),
            other => Err(ParamError::UnknownAlgorithm(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("unknown synthesis algorithm {0:?}")]
    UnknownAlgorithm(String),

    #[error("{field} must be a positive integer, but is {value:?}")]
    NotPositive { field: &'static str, value: String },
}

/// Parameters handed to the solver together with a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisParameters {
    pub algorithm: Algorithm,
    /// Only meaningful for [`Algorithm::EpsilonNashEquilibrium`].
    pub number_of_iterations: u32,
    pub timebound: u32,
}

impl Default for SynthesisParameters {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Collective,
            number_of_iterations: 10,
            timebound: 5,
        }
    }
}

/// String forms of [`SynthesisParameters`] as the external protocol carries them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireParameters {
    pub algorithm: String,
    pub number_of_iterations: String,
    pub timebound: String,
}

impl SynthesisParameters {
    pub fn to_wire(&self) -> WireParameters {
        WireParameters {
            algorithm: self.algorithm.code().to_string(),
            number_of_iterations: self.number_of_iterations.to_string(),
            timebound: self.timebound.to_string(),
        }
    }

    pub fn from_wire(algorithm: &str, number_of_iterations: &str, timebound: &str) -> Result<Self, ParamError> {
        Ok(Self {
            algorithm: algorithm.parse()?,
            number_of_iterations: parse_positive("numberOfIterations", number_of_iterations)?,
            timebound: parse_positive("timebound", timebound)?,
        })
    }
}

fn parse_positive(field: &'static str, value: &str) -> Result<u32, ParamError> {
    match value.trim().parse::<u32>() {
        Ok(num) if num > 0 => Ok(num),
        _ => Err(ParamError::NotPositive {
            field,
            value: value.to_string(),
        }),
    }
}
