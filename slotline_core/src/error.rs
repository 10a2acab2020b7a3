use thiserror::Error;

/// Configuration errors raised by the engine. None of these are retryable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid grid dimensions: {reels} reels x {rows} rows over {symbols} symbols")]
    InvalidDimensions {
        reels: usize,
        rows: usize,
        symbols: usize,
    },
    #[error("grid rows must be non-empty and equal in length ({reels} reels, {rows} rows)")]
    RaggedGrid { reels: usize, rows: usize },
    #[error("payline {index} references ({reel}, {row}) outside a {reels}x{rows} grid")]
    InvalidPayline {
        index: usize,
        reel: usize,
        row: usize,
        reels: usize,
        rows: usize,
    },
    #[error("payline {index} has {len} coordinates, expected {reels}")]
    PaylineLength {
        index: usize,
        len: usize,
        reels: usize,
    },
    #[error("win percentage {0} is outside 0..=100")]
    InvalidWinPercentage(f64),
}

impl EngineError {
    /// True for both payline shape errors.
    pub fn is_invalid_payline(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidPayline { .. } | EngineError::PaylineLength { .. }
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
