use notary_value::{Binary, Catalog, Moment, Name, Tag, Value, Version};

use crate::error::NotaryError;

/// The five-attribute catalog of spec.md §3: a tamper-evident reference to
/// one version of one document. `$type` is a parameter, not an attribute,
/// and carries the schema version tied to the protocol that produced it.
pub struct Citation;

impl Citation {
    pub fn build(protocol: &Version, timestamp: Moment, tag: Tag, version: Version, digest: Binary) -> Catalog {
        let type_name = Name::parse(&format!("/bali/notary/Citation/{}", protocol.to_text()))
            .expect("protocol-derived type name is always well-formed");
        Catalog::new()
            .with_attribute("$protocol", protocol.clone())
            .with_attribute("$timestamp", timestamp)
            .with_attribute("$tag", tag)
            .with_attribute("$version", version)
            .with_attribute("$digest", digest)
            .with_parameter("$type", type_name)
    }

    pub fn protocol(catalog: &Catalog) -> Result<Version, NotaryError> {
        expect_version(catalog, "$protocol")
    }

    pub fn tag(catalog: &Catalog) -> Result<Tag, NotaryError> {
        expect_tag(catalog, "$tag")
    }

    pub fn version(catalog: &Catalog) -> Result<Version, NotaryError> {
        expect_version(catalog, "$version")
    }

    pub fn digest(catalog: &Catalog) -> Result<Binary, NotaryError> {
        expect_binary(catalog, "$digest")
    }
}

/// The `$previous`/`$certificate` slot's type (§9 Open Question, resolved in
/// SPEC_FULL.md §8): either a full citation catalog, or the `none` sentinel.
/// Any other value is `invalidParameter`.
pub enum CitationSlot {
    Citation(Catalog),
    None,
}

impl CitationSlot {
    pub fn from_value(value: &Value, module: &'static str, procedure: &'static str) -> Result<Self, NotaryError> {
        match value {
            Value::Catalog(c) => Ok(CitationSlot::Citation((**c).clone())),
            Value::None => Ok(CitationSlot::None),
            other => Err(NotaryError::InvalidParameter {
                module,
                procedure,
                text: format!("citation slot holds neither a catalog nor none: {other:?}"),
            }),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            CitationSlot::Citation(c) => Value::Catalog(Box::new(c)),
            CitationSlot::None => Value::None,
        }
    }
}

pub(crate) fn expect_version(catalog: &Catalog, name: &str) -> Result<Version, NotaryError> {
    match catalog.require_attribute(name)? {
        Value::Version(v) => Ok(v.clone()),
        other => Err(NotaryError::InvalidParameter {
            module: "notary",
            procedure: "parse",
            text: format!("{name} is not a version: {other:?}"),
        }),
    }
}

pub(crate) fn expect_tag(catalog: &Catalog, name: &str) -> Result<Tag, NotaryError> {
    match catalog.require_attribute(name)? {
        Value::Tag(t) => Ok(t.clone()),
        other => Err(NotaryError::InvalidParameter {
            module: "notary",
            procedure: "parse",
            text: format!("{name} is not a tag: {other:?}"),
        }),
    }
}

pub(crate) fn expect_binary(catalog: &Catalog, name: &str) -> Result<Binary, NotaryError> {
    match catalog.require_attribute(name)? {
        Value::Binary(b) => Ok(b.clone()),
        other => Err(NotaryError::InvalidParameter {
            module: "notary",
            procedure: "parse",
            text: format!("{name} is not binary: {other:?}"),
        }),
    }
}

pub(crate) fn expect_moment(catalog: &Catalog, name: &str) -> Result<Moment, NotaryError> {
    match catalog.require_attribute(name)? {
        Value::Moment(m) => Ok(m.clone()),
        other => Err(NotaryError::InvalidParameter {
            module: "notary",
            procedure: "parse",
            text: format!("{name} is not a moment: {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_reads_back_a_citation() {
        let protocol = Version::parse("v2").unwrap();
        let tag = Tag::generate();
        let version = Version::initial();
        let digest = Binary::new(vec![9, 9, 9]);
        let catalog = Citation::build(&protocol, Moment::now(), tag.clone(), version.clone(), digest.clone());

        assert_eq!(Citation::protocol(&catalog).unwrap(), protocol);
        assert_eq!(Citation::tag(&catalog).unwrap(), tag);
        assert_eq!(Citation::version(&catalog).unwrap(), version);
        assert_eq!(Citation::digest(&catalog).unwrap(), digest);
    }

    #[test]
    fn slot_round_trips_both_inhabitants() {
        let catalog = Citation::build(
            &Version::parse("v2").unwrap(),
            Moment::now(),
            Tag::generate(),
            Version::initial(),
            Binary::new(vec![1]),
        );
        let as_citation = CitationSlot::from_value(&Value::Catalog(Box::new(catalog.clone())), "x", "y").unwrap();
        assert!(matches!(as_citation, CitationSlot::Citation(_)));

        let as_none = CitationSlot::from_value(&Value::None, "x", "y").unwrap();
        assert!(matches!(as_none, CitationSlot::None));

        assert!(CitationSlot::from_value(&Value::Text("oops".into()), "x", "y").is_err());
    }
}
