use thiserror::Error;

use crate::stores::StoreError;

/// Failures an engine entry point can surface to its caller. Cloud
/// fetch and per-entity metrics failures are recovered internally and
/// never appear here; only the local snapshot store can fail a call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
