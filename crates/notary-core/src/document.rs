use notary_value::{Binary, Catalog, Moment, Name, Tag, Value, Version};

use crate::citation::{expect_binary, expect_moment, expect_version, CitationSlot};
use crate::error::NotaryError;

const SIGNABLE_ATTRIBUTES: [&str; 4] = ["$component", "$protocol", "$timestamp", "$certificate"];

/// The five-attribute catalog of spec.md §3. Assembly is split in two:
/// [`assemble`] produces the unsigned four-attribute form whose canonical
/// bytes are what the SSM signs, and [`finalize`] inserts the returned
/// `$signature` plus the `$type` parameter to produce the document callers
/// actually receive.
pub struct NotarizedDocument;

impl NotarizedDocument {
    pub fn assemble(component: Value, protocol: &Version, timestamp: Moment, certificate: CitationSlot) -> Catalog {
        Catalog::new()
            .with_attribute("$component", component)
            .with_attribute("$protocol", protocol.clone())
            .with_attribute("$timestamp", timestamp)
            .with_attribute("$certificate", certificate.into_value())
    }

    /// The exact bytes `SSM.signBytes` is called with — the canonical form
    /// of the unsigned document.
    pub fn signable_bytes(unsigned: &Catalog) -> Vec<u8> {
        unsigned.to_canonical_bytes()
    }

    pub fn finalize(mut unsigned: Catalog, protocol: &Version, signature: Binary) -> Catalog {
        unsigned.set_attribute("$signature", signature);
        let type_name = Name::parse(&format!("/bali/notary/Document/{}", protocol.to_text()))
            .expect("protocol-derived type name is always well-formed");
        unsigned.set_parameter("$type", type_name);
        unsigned
    }

    pub fn component(catalog: &Catalog) -> Result<Value, NotaryError> {
        catalog.require_attribute("$component").map(Clone::clone).map_err(Into::into)
    }

    pub fn protocol(catalog: &Catalog) -> Result<Version, NotaryError> {
        expect_version(catalog, "$protocol")
    }

    pub fn timestamp(catalog: &Catalog) -> Result<Moment, NotaryError> {
        expect_moment(catalog, "$timestamp")
    }

    pub fn certificate(catalog: &Catalog) -> Result<CitationSlot, NotaryError> {
        let value = catalog.require_attribute("$certificate")?;
        CitationSlot::from_value(value, "notary", "document.certificate")
    }

    pub fn signature(catalog: &Catalog) -> Result<Binary, NotaryError> {
        expect_binary(catalog, "$signature")
    }

    /// Rebuilds the exact byte string `$signature` was computed over
    /// (spec.md §4.2 `validDocument`: "the document with only
    /// `{$component, $protocol, $timestamp, $certificate}` (in that
    /// order)").
    pub fn signed_payload_bytes(catalog: &Catalog) -> Result<Vec<u8>, NotaryError> {
        let payload = catalog.select_attributes(&SIGNABLE_ATTRIBUTES)?;
        Ok(payload.to_canonical_bytes())
    }

    /// Reads `$tag`/`$version` off a component's own parameters — used by
    /// `citeDocument`, which cites by the embedded component's lineage, not
    /// the document's own identity (spec.md §4.2).
    pub fn component_tag_version(component: &Value) -> Result<(Tag, Version), NotaryError> {
        let Value::Catalog(inner) = component else {
            return Err(NotaryError::InvalidParameter {
                module: "notary",
                procedure: "citeDocument",
                text: format!("component is not a catalog: {component:?}"),
            });
        };
        let tag = match inner.require_parameter("$tag")? {
            Value::Tag(t) => t.clone(),
            other => {
                return Err(NotaryError::InvalidParameter {
                    module: "notary",
                    procedure: "citeDocument",
                    text: format!("component's $tag parameter is not a tag: {other:?}"),
                })
            }
        };
        let version = match inner.require_parameter("$version")? {
            Value::Version(v) => v.clone(),
            other => {
                return Err(NotaryError::InvalidParameter {
                    module: "notary",
                    procedure: "citeDocument",
                    text: format!("component's $version parameter is not a version: {other:?}"),
                })
            }
        };
        Ok((tag, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signable_bytes_excludes_signature_and_type() {
        let protocol = Version::parse("v2").unwrap();
        let unsigned = NotarizedDocument::assemble(
            Value::Text("payload".into()),
            &protocol,
            Moment::now(),
            CitationSlot::None,
        );
        let bytes = NotarizedDocument::signable_bytes(&unsigned);
        assert!(!String::from_utf8_lossy(&bytes).contains("$signature"));

        let signed = NotarizedDocument::finalize(unsigned, &protocol, Binary::new(vec![1, 2, 3]));
        assert_eq!(NotarizedDocument::signature(&signed).unwrap(), Binary::new(vec![1, 2, 3]));
    }

    #[test]
    fn signed_payload_bytes_match_the_original_signable_bytes() {
        let protocol = Version::parse("v2").unwrap();
        let unsigned = NotarizedDocument::assemble(
            Value::Text("payload".into()),
            &protocol,
            Moment::now(),
            CitationSlot::None,
        );
        let signable = NotarizedDocument::signable_bytes(&unsigned);
        let signed = NotarizedDocument::finalize(unsigned, &protocol, Binary::new(vec![7]));
        let recomputed = NotarizedDocument::signed_payload_bytes(&signed).unwrap();
        assert_eq!(signable, recomputed);
    }
}
