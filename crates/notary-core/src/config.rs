use notary_value::{Catalog, Value};

use crate::citation::CitationSlot;
use crate::error::NotaryError;
use crate::state::NotaryState;

/// Builds the notary's persisted catalog (spec.md §6 "Notary file"):
/// `$state`, `$certificate`, `$citation`. The latter two reuse the
/// citation-or-none slot typing since both are absent before `generateKey`.
pub fn to_catalog(state: NotaryState, certificate: Option<&Catalog>, citation: Option<&Catalog>) -> Catalog {
    let mut catalog = Catalog::new().with_attribute("$state", Value::Text(state.to_text().to_string()));
    catalog.set_attribute("$certificate", to_slot_value(certificate));
    catalog.set_attribute("$citation", to_slot_value(citation));
    catalog
}

fn to_slot_value(catalog: Option<&Catalog>) -> Value {
    match catalog {
        Some(c) => Value::Catalog(Box::new(c.clone())),
        None => Value::None,
    }
}

pub struct LoadedNotary {
    pub state: NotaryState,
    pub certificate: Option<Catalog>,
    pub citation: Option<Catalog>,
}

pub fn from_catalog(catalog: &Catalog) -> Result<LoadedNotary, NotaryError> {
    let state_text = match catalog.require_attribute("$state")? {
        Value::Text(s) => s.clone(),
        other => {
            return Err(NotaryError::Unexpected {
                module: "notary",
                procedure: "load",
                text: format!("$state is not text: {other:?}"),
                cause: None,
            })
        }
    };
    let state = NotaryState::parse(&state_text).ok_or_else(|| NotaryError::Unexpected {
        module: "notary",
        procedure: "load",
        text: format!("unknown notary state {state_text:?}"),
        cause: None,
    })?;

    let certificate = match CitationSlot::from_value(catalog.require_attribute("$certificate")?, "notary", "load")? {
        CitationSlot::Citation(c) => Some(c),
        CitationSlot::None => None,
    };
    let citation = match CitationSlot::from_value(catalog.require_attribute("$citation")?, "notary", "load")? {
        CitationSlot::Citation(c) => Some(c),
        CitationSlot::None => None,
    };

    Ok(LoadedNotary { state, certificate, citation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::Certificate;
    use crate::citation::Citation;
    use notary_value::{Binary, Moment, Tag, Version};

    #[test]
    fn round_trips_a_fresh_limited_notary() {
        let catalog = to_catalog(NotaryState::Limited, None, None);
        let text = catalog.to_canonical_text();
        let parsed = Catalog::parse(&text).unwrap();
        let loaded = from_catalog(&parsed).unwrap();
        assert_eq!(loaded.state, NotaryState::Limited);
        assert!(loaded.certificate.is_none());
        assert!(loaded.citation.is_none());
    }

    #[test]
    fn round_trips_an_enabled_notary_with_certificate_and_citation() {
        let protocol = Version::parse("v2").unwrap();
        let certificate = Certificate::build(
            &protocol,
            Moment::now(),
            Tag::generate(),
            Binary::new(vec![1, 2, 3]),
            Tag::generate(),
            Version::initial(),
            CitationSlot::None,
        );
        let citation = Citation::build(&protocol, Moment::now(), Tag::generate(), Version::initial(), Binary::new(vec![4]));

        let catalog = to_catalog(NotaryState::Enabled, Some(&certificate), Some(&citation));
        let parsed = Catalog::parse(&catalog.to_canonical_text()).unwrap();
        let loaded = from_catalog(&parsed).unwrap();
        assert_eq!(loaded.state, NotaryState::Enabled);
        assert_eq!(loaded.certificate, Some(certificate));
        assert_eq!(loaded.citation, Some(citation));
    }
}
