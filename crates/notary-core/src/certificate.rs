use notary_value::{Binary, Catalog, Moment, Name, Tag, Value, Version};

use crate::citation::{expect_binary, expect_moment, expect_tag, expect_version, CitationSlot};
use crate::error::NotaryError;

/// The four-attribute, five-parameter catalog of spec.md §3. `$previous` is
/// either a citation catalog or the `none` sentinel — see
/// [`CitationSlot`](crate::citation::CitationSlot).
pub struct Certificate;

impl Certificate {
    pub fn build(
        protocol: &Version,
        timestamp: Moment,
        account: Tag,
        public_key: Binary,
        tag: Tag,
        version: Version,
        previous: CitationSlot,
    ) -> Catalog {
        let protocol_text = protocol.to_text();
        let type_name = Name::parse(&format!("/bali/notary/Certificate/{protocol_text}"))
            .expect("protocol-derived type name is always well-formed");
        let permissions = Name::parse(&format!("/bali/permissions/public/{protocol_text}"))
            .expect("protocol-derived permissions name is always well-formed");

        Catalog::new()
            .with_attribute("$protocol", protocol.clone())
            .with_attribute("$timestamp", timestamp)
            .with_attribute("$account", account)
            .with_attribute("$publicKey", public_key)
            .with_parameter("$type", type_name)
            .with_parameter("$tag", tag)
            .with_parameter("$version", version)
            .with_parameter("$permissions", permissions)
            .with_parameter("$previous", previous.into_value())
    }

    pub fn protocol(catalog: &Catalog) -> Result<Version, NotaryError> {
        expect_version(catalog, "$protocol")
    }

    pub fn timestamp(catalog: &Catalog) -> Result<Moment, NotaryError> {
        expect_moment(catalog, "$timestamp")
    }

    pub fn account(catalog: &Catalog) -> Result<Tag, NotaryError> {
        expect_tag(catalog, "$account")
    }

    pub fn public_key(catalog: &Catalog) -> Result<Binary, NotaryError> {
        expect_binary(catalog, "$publicKey")
    }

    pub fn tag(catalog: &Catalog) -> Result<Tag, NotaryError> {
        match catalog.require_parameter("$tag")? {
            Value::Tag(t) => Ok(t.clone()),
            other => Err(NotaryError::InvalidParameter {
                module: "notary",
                procedure: "parse",
                text: format!("$tag parameter is not a tag: {other:?}"),
            }),
        }
    }

    pub fn version(catalog: &Catalog) -> Result<Version, NotaryError> {
        match catalog.require_parameter("$version")? {
            Value::Version(v) => Ok(v.clone()),
            other => Err(NotaryError::InvalidParameter {
                module: "notary",
                procedure: "parse",
                text: format!("$version parameter is not a version: {other:?}"),
            }),
        }
    }

    pub fn previous(catalog: &Catalog) -> Result<CitationSlot, NotaryError> {
        let value = catalog.require_parameter("$previous")?;
        CitationSlot::from_value(value, "notary", "certificate.previous")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_very_first_certificate_with_previous_none() {
        let protocol = Version::parse("v2").unwrap();
        let tag = Tag::generate();
        let account = Tag::generate();
        let public_key = Binary::new(vec![1, 2, 3]);
        let catalog = Certificate::build(
            &protocol,
            Moment::now(),
            account.clone(),
            public_key.clone(),
            tag.clone(),
            Version::initial(),
            CitationSlot::None,
        );

        assert_eq!(Certificate::protocol(&catalog).unwrap(), protocol);
        assert_eq!(Certificate::account(&catalog).unwrap(), account);
        assert_eq!(Certificate::public_key(&catalog).unwrap(), public_key);
        assert_eq!(Certificate::tag(&catalog).unwrap(), tag);
        assert_eq!(Certificate::version(&catalog).unwrap(), Version::initial());
        assert!(matches!(Certificate::previous(&catalog).unwrap(), CitationSlot::None));
    }

    #[test]
    fn round_trips_through_canonical_text() {
        let catalog = Certificate::build(
            &Version::parse("v2").unwrap(),
            Moment::now(),
            Tag::generate(),
            Binary::new(vec![9]),
            Tag::generate(),
            Version::initial(),
            CitationSlot::None,
        );
        let parsed = Catalog::parse(&catalog.to_canonical_text()).unwrap();
        assert_eq!(catalog, parsed);
    }
}
