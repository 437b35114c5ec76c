use notary_ssm::SsmInstance;

use crate::error::NotaryError;

/// The insertion-ordered protocol → SSM-instance map of spec.md §6. The
/// first entry is the active writing protocol; every entry is eligible for
/// reading (`validDocument`, `citationMatches`). Instances constructed here
/// are stateless verifiers — the registry never resurrects key-lifecycle
/// state for a protocol other than the notary's own live SSM.
pub struct ProtocolRegistry {
    entries: Vec<(&'static str, fn() -> SsmInstance)>,
}

impl ProtocolRegistry {
    pub fn standard() -> Self {
        Self {
            entries: vec![
                ("v2", SsmInstance::fresh_v2 as fn() -> SsmInstance),
                ("v1", SsmInstance::v1_verifier as fn() -> SsmInstance),
            ],
        }
    }

    pub fn active_protocol(&self) -> &'static str {
        self.entries[0].0
    }

    pub fn resolve(&self, protocol: &str, procedure: &'static str) -> Result<SsmInstance, NotaryError> {
        self.entries
            .iter()
            .find(|(name, _)| *name == protocol)
            .map(|(_, constructor)| constructor())
            .ok_or_else(|| NotaryError::UnsupportedProtocol {
                module: "notary",
                procedure,
                actual: protocol.to_string(),
                expected: self.entries.iter().map(|(name, _)| *name).collect(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v2_is_the_active_protocol() {
        assert_eq!(ProtocolRegistry::standard().active_protocol(), "v2");
    }

    #[test]
    fn resolves_both_registered_protocols() {
        let registry = ProtocolRegistry::standard();
        assert!(registry.resolve("v2", "test").is_ok());
        assert!(registry.resolve("v1", "test").is_ok());
    }

    #[test]
    fn unknown_protocol_names_the_registered_set() {
        let registry = ProtocolRegistry::standard();
        match registry.resolve("v99", "validDocument") {
            Err(NotaryError::UnsupportedProtocol { actual, expected, .. }) => {
                assert_eq!(actual, "v99");
                assert_eq!(expected, vec!["v2", "v1"]);
            }
            other => panic!("expected UnsupportedProtocol, got {other:?}"),
        }
    }
}
