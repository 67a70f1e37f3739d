//! Error types for the reconciliation pipeline and the engine link.

use crate::model::ChannelKind;
use thiserror::Error;

/// Why an inbound engine event could not be applied.
#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    /// A level snapshot does not line up with the current channel arrays.
    #[error("Level snapshot has {actual} {kind} samples but the model has {expected}")]
    LevelShapeMismatch {
        kind: ChannelKind,
        expected: usize,
        actual: usize,
    },
}

/// Failures on the connection to the engine.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Command queue closed")]
    QueueClosed,
}
