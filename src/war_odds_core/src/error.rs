use thiserror::Error;

/// A misconfigured engine. Raised once, when the engine is built.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("house edge must be a finite non-negative fraction, got {0}")]
    NegativeHouseEdge(f64),

    #[error("probability band [{floor}, {ceiling}] must satisfy 0 < floor < 0.5 < ceiling < 1")]
    InvalidProbabilityBand { floor: f64, ceiling: f64 },

    #[error("max implied probability must lie in (0, 1), got {0}")]
    InvalidImpliedCeiling(f64),

    #[error("max implied probability {max_implied} is below the clamp ceiling {ceiling}; the favourite would be priced under its true probability")]
    ImpliedCeilingBelowBand { max_implied: f64, ceiling: f64 },

    #[error("variance must lie in [0, 0.5), got {0}")]
    InvalidVariance(f64),

    #[error("clean odds ladder is empty but ladder mode is enabled")]
    EmptyLadder,

    #[error("clean odds ladder must be strictly ascending and above 1.0 (entry {index}: {value})")]
    InvalidLadder { index: usize, value: f64 },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// A caller passed a value that an upstream stage should never produce.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    #[error("invalid stake: {0}")]
    InvalidStake(i64),

    #[error("invalid decimal odds: {0} (must be > 1.0)")]
    InvalidOdds(f64),

    #[error("{stage}: probability {value} outside (0, 1)")]
    ProbabilityOutOfRange { stage: &'static str, value: f64 },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("failed to parse faction roster: {0}")]
    Roster(#[from] serde_json::Error),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
