use crate::error::NotaryError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NotaryState {
    Limited,
    Pending,
    Enabled,
}

impl NotaryState {
    pub fn to_text(self) -> &'static str {
        match self {
            NotaryState::Limited => "limited",
            NotaryState::Pending => "pending",
            NotaryState::Enabled => "enabled",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "limited" => Some(NotaryState::Limited),
            "pending" => Some(NotaryState::Pending),
            "enabled" => Some(NotaryState::Enabled),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NotaryEvent {
    GenerateKey,
    ActivateKey,
    GetCitation,
    NotarizeComponent,
    RefreshKey,
}

/// Pure transition table (spec.md §4.2, §9 "do not scatter conditionals").
/// `notarizeComponent` is deliberately legal in `pending` — the self-signing
/// step `activateKey` depends on. `forgetKey` bypasses this table entirely
/// (§4.2: "always legal").
pub fn transition(state: NotaryState, event: NotaryEvent) -> Result<NotaryState, NotaryError> {
    use NotaryEvent::*;
    use NotaryState::*;

    match (state, event) {
        (Limited, GenerateKey) => Ok(Pending),
        (Pending, ActivateKey) => Ok(Enabled),
        (Pending, NotarizeComponent) => Ok(Pending),
        (Enabled, GetCitation) => Ok(Enabled),
        (Enabled, NotarizeComponent) => Ok(Enabled),
        (Enabled, RefreshKey) => Ok(Enabled),
        _ => Err(NotaryError::InvalidEvent {
            module: "notary",
            procedure: "transition",
            state,
            event,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use NotaryEvent::*;
    use NotaryState::*;

    #[test]
    fn legal_transitions_match_the_table() {
        assert_eq!(transition(Limited, GenerateKey).unwrap(), Pending);
        assert_eq!(transition(Pending, ActivateKey).unwrap(), Enabled);
        assert_eq!(transition(Pending, NotarizeComponent).unwrap(), Pending);
        assert_eq!(transition(Enabled, GetCitation).unwrap(), Enabled);
        assert_eq!(transition(Enabled, NotarizeComponent).unwrap(), Enabled);
        assert_eq!(transition(Enabled, RefreshKey).unwrap(), Enabled);
    }

    #[test]
    fn illegal_transitions_fail_and_name_the_pair() {
        for (state, event) in [
            (Limited, ActivateKey),
            (Limited, GetCitation),
            (Limited, NotarizeComponent),
            (Limited, RefreshKey),
            (Pending, GenerateKey),
            (Pending, GetCitation),
            (Pending, RefreshKey),
            (Enabled, GenerateKey),
            (Enabled, ActivateKey),
        ] {
            match transition(state, event) {
                Err(NotaryError::InvalidEvent { state: s, event: e, .. }) => {
                    assert_eq!(s, state);
                    assert_eq!(e, event);
                }
                other => panic!("expected InvalidEvent, got {other:?}"),
            }
        }
    }
}
