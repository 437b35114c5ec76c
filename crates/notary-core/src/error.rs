use thiserror::Error;

use crate::state::{NotaryEvent, NotaryState};

/// The seven exception kinds of spec.md §7, each carrying enough context to
/// reconstruct the failing call site without a stack trace. Mirrors
/// `chronx_core::error::ChronxError`'s flat-enum-with-context shape.
#[derive(Debug, Error)]
pub enum NotaryError {
    #[error("[{module}.{procedure}] invalid parameter: {text}")]
    InvalidParameter { module: &'static str, procedure: &'static str, text: String },

    #[error("[{module}.{procedure}] illegal event {event:?} in state {state:?}")]
    InvalidEvent {
        module: &'static str,
        procedure: &'static str,
        state: NotaryState,
        event: NotaryEvent,
    },

    #[error("[{module}.{procedure}] invalid certificate: {text}")]
    InvalidCertificate { module: &'static str, procedure: &'static str, text: String },

    #[error("[{module}.{procedure}] unsupported protocol {actual:?}, expected one of {expected:?}")]
    UnsupportedProtocol {
        module: &'static str,
        procedure: &'static str,
        actual: String,
        expected: Vec<&'static str>,
    },

    #[error("[{module}.{procedure}] storage failure: {text}")]
    Storage { module: &'static str, procedure: &'static str, text: String },

    #[error("[{module}.{procedure}] unexpected failure: {text}")]
    Unexpected {
        module: &'static str,
        procedure: &'static str,
        text: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl NotaryError {
    /// The propagation policy of spec.md §7: everything that is not already
    /// one of the named kinds is rethrown as `unexpected` with the original
    /// chained as `$cause` for diagnostic continuity. The legacy v1
    /// write-attempt open question (SPEC_FULL.md §8) takes this catch-all,
    /// since §7 defines no dedicated kind for it.
    pub fn wrap_unexpected(
        module: &'static str,
        procedure: &'static str,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        NotaryError::Unexpected { module, procedure, text: cause.to_string(), cause: Some(Box::new(cause)) }
    }
}

impl From<notary_ssm::SsmError> for NotaryError {
    fn from(e: notary_ssm::SsmError) -> Self {
        match e {
            notary_ssm::SsmError::Storage(text) => {
                NotaryError::Storage { module: "ssm", procedure: "persist", text }
            }
            other => NotaryError::wrap_unexpected("ssm", "operation", other),
        }
    }
}

impl From<notary_store::StoreError> for NotaryError {
    fn from(e: notary_store::StoreError) -> Self {
        NotaryError::Storage { module: "notary", procedure: "persist", text: e.to_string() }
    }
}

impl From<notary_value::ValueError> for NotaryError {
    fn from(e: notary_value::ValueError) -> Self {
        NotaryError::InvalidParameter { module: "notary", procedure: "parse", text: e.to_string() }
    }
}
