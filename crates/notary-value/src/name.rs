use std::fmt;

use crate::error::ValueError;

/// A validated slash-separated identifier, e.g. `/bali/notary/Certificate/v2`.
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Name(String);

impl Name {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        if !text.starts_with('/') || text.ends_with('/') || text.contains("//") {
            return Err(ValueError::InvalidName(text.to_string()));
        }
        if text[1..].split('/').any(|segment| segment.is_empty()) {
            return Err(ValueError::InvalidName(text.to_string()));
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_path() {
        assert!(Name::parse("/bali/notary/Certificate/v2").is_ok());
    }

    #[test]
    fn rejects_missing_leading_slash() {
        assert!(Name::parse("bali/notary").is_err());
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(Name::parse("/bali//notary").is_err());
        assert!(Name::parse("/bali/notary/").is_err());
    }
}
