use thiserror::Error;

/// Reasons a position sample is refused by a [`PositionBuffer`](super::PositionBuffer)
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SampleError {
    /// Position, velocity, rotation or timestamp was NaN or infinite
    #[error("Position sample at {timestamp} holds a non-finite value")]
    NonFinite { timestamp: f64 },

    /// The sample is not newer than the last reconciled waypoint
    #[error("Position sample at {timestamp} is older than the last reconciled sample at {last_reconciled}")]
    Stale { timestamp: f64, last_reconciled: f64 },

    /// A sample with the same timestamp is already buffered
    #[error("Position sample at {timestamp} is already buffered")]
    Duplicate { timestamp: f64 },
}
