use crate::error::SsmError;

/// The SSM's key-lifecycle state (spec.md §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsmState {
    Keyless,
    LoneKey,
    TwoKeys,
}

impl SsmState {
    pub fn to_text(self) -> &'static str {
        match self {
            SsmState::Keyless => "keyless",
            SsmState::LoneKey => "loneKey",
            SsmState::TwoKeys => "twoKeys",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "keyless" => Some(SsmState::Keyless),
            "loneKey" => Some(SsmState::LoneKey),
            "twoKeys" => Some(SsmState::TwoKeys),
            _ => None,
        }
    }
}

/// Events that drive the SSM's state machine. `digestBytes`, `validSignature`,
/// `getTag`, `getProtocol` and `eraseKeys` bypass this table entirely — they
/// are legal in every state (spec.md §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsmEvent {
    GenerateKeys,
    SignBytes,
    RotateKeys,
}

/// The single pure transition function for the SSM's state machine
/// (spec.md §9: "a single `transition(state, event)` function suffices;
/// do not scatter conditionals").
pub fn transition(state: SsmState, event: SsmEvent) -> Result<SsmState, SsmError> {
    use SsmEvent::*;
    use SsmState::*;

    match (state, event) {
        (Keyless, GenerateKeys) => Ok(LoneKey),
        (LoneKey, SignBytes) => Ok(LoneKey),
        (LoneKey, RotateKeys) => Ok(TwoKeys),
        (TwoKeys, SignBytes) => Ok(LoneKey),
        _ => Err(SsmError::InvalidEvent { state, event }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_keys_moves_keyless_to_lone_key() {
        assert_eq!(transition(SsmState::Keyless, SsmEvent::GenerateKeys).unwrap(), SsmState::LoneKey);
    }

    #[test]
    fn sign_bytes_is_idempotent_in_lone_key() {
        assert_eq!(transition(SsmState::LoneKey, SsmEvent::SignBytes).unwrap(), SsmState::LoneKey);
    }

    #[test]
    fn rotate_keys_moves_lone_key_to_two_keys() {
        assert_eq!(transition(SsmState::LoneKey, SsmEvent::RotateKeys).unwrap(), SsmState::TwoKeys);
    }

    #[test]
    fn sign_bytes_collapses_two_keys_to_lone_key() {
        assert_eq!(transition(SsmState::TwoKeys, SsmEvent::SignBytes).unwrap(), SsmState::LoneKey);
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        assert!(transition(SsmState::Keyless, SsmEvent::SignBytes).is_err());
        assert!(transition(SsmState::Keyless, SsmEvent::RotateKeys).is_err());
        assert!(transition(SsmState::LoneKey, SsmEvent::GenerateKeys).is_err());
        assert!(transition(SsmState::TwoKeys, SsmEvent::GenerateKeys).is_err());
        assert!(transition(SsmState::TwoKeys, SsmEvent::RotateKeys).is_err());
    }
}
