use std::fmt;

use data_encoding::BASE32_NOPAD;
use rand::RngCore;

use crate::error::ValueError;

/// A stable, randomly-generated identifier, the structured-value framework's
/// `tag` scalar type (`$tag`, `$account`, the SSM's own `$tag`). Textual form
/// is `#<base32, no padding>`.
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Tag(#[serde(with = "tag_bytes")] [u8; 16]);

mod tag_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 16], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 16], D::Error> {
        let v = <Vec<u8>>::deserialize(d)?;
        v.try_into()
            .map_err(|_| serde::de::Error::custom("tag must be 16 bytes"))
    }
}

impl Tag {
    /// Draw a fresh random tag. Grounded on the teacher's `AccountId`
    /// derivation, but unlike an account id a tag is not derived from any
    /// key material — it is an opaque random identifier for a certificate
    /// lineage.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_text(&self) -> String {
        format!("#{}", BASE32_NOPAD.encode(&self.0))
    }

    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let stripped = text
            .strip_prefix('#')
            .ok_or_else(|| ValueError::InvalidTag(text.to_string()))?;
        let bytes = BASE32_NOPAD
            .decode(stripped.as_bytes())
            .map_err(|e| ValueError::InvalidTag(e.to_string()))?;
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| ValueError::InvalidTag(format!("tag {text:?} is not 16 bytes")))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_text() {
        let tag = Tag::generate();
        let text = tag.to_text();
        let parsed = Tag::parse(&text).unwrap();
        assert_eq!(tag, parsed);
    }

    #[test]
    fn two_generated_tags_differ() {
        assert_ne!(Tag::generate(), Tag::generate());
    }

    #[test]
    fn rejects_missing_sigil() {
        assert!(Tag::parse("ABCDEF").is_err());
    }
}
