use bs_core::BsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("state vector has {got} entries, expected {expected}")]
    StateLength {
        expected: usize,
        got:      usize,
    },

    #[error("state vector entry {index} is not a valid bus status code: {value}")]
    InvalidStatus {
        index: usize,
        value: f64,
    },

    #[error(transparent)]
    Core(#[from] BsError),
}

pub type SimResult<T> = Result<T, SimError>;
