//! Engine errors: contract violations surfaced to the caller, never swallowed.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Some target cell of the shape is out of bounds or already filled.
    #[error("invalid placement at anchor ({x}, {y})")]
    InvalidPlacement { x: i32, y: i32 },
    #[error("pool index {index} out of range (pool has {len} blocks)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("spawner capacity must be at least 1")]
    ZeroCapacity,
    #[error("catalog has no usable shapes or colours")]
    EmptyCatalog,
    /// No pooled block fits; only a reset accepts drops again.
    #[error("game is over")]
    GameOver,
}
