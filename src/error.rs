use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse instance JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to build internal instance model: {0}")]
    ModelConstructionError(String),

    #[error("Invalid unit value: '{0}'")]
    InvalidUnit(String),

    #[error("Unsupported fitness function: '{0}'")]
    UnsupportedFitness(String),

    #[error("Unsupported arbiter: '{0}', expected 'makespan' or 'energy'")]
    UnsupportedArbiter(String),

    #[error("No fitness calculator configured for objective '{0}'")]
    EmptyCalculatorPool(String),

    #[error("The solution must have been evaluated first")]
    UnevaluatedBaseline,

    #[error("Task '{0}' is missing from the baseline schedule")]
    MissingBaselineTask(String),

    #[error("Operator '{operator}' cannot apply a '{movement}' movement")]
    MismatchedMovement { operator: &'static str, movement: &'static str },

    #[error("Random keys vector has {actual} values, expected {expected}")]
    InvalidEncoding { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
