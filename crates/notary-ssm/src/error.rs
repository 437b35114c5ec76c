use notary_store::StoreError;
use thiserror::Error;

use crate::state::{SsmEvent, SsmState};

#[derive(Debug, Error)]
pub enum SsmError {
    #[error("illegal event {event:?} in state {state:?}")]
    InvalidEvent { state: SsmState, event: SsmEvent },

    #[error("storage error: {0}")]
    Storage(String),

    /// v1 is retained only for verifying legacy documents (spec.md §6); this
    /// codebase never generates, rotates or signs with a v1 key.
    #[error("protocol v1 is read-only in this implementation")]
    LegacyProtocolReadOnly,

    #[error("{0}")]
    Unexpected(String),
}

impl From<StoreError> for SsmError {
    fn from(e: StoreError) -> Self {
        SsmError::Storage(e.to_string())
    }
}
