use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::ValueError;

/// The framework's opaque-bytes scalar. Textual form is `'<base64>'`.
///
/// `Debug` deliberately prints only a byte count: binaries carry digests,
/// signatures and public keys, never private key material directly (the SSM
/// never hands private bytes to this type), but the habit of not echoing
/// payload bytes into logs is kept regardless.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Binary(Vec<u8>);

impl Binary {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn to_text(&self) -> String {
        format!("'{}'", STANDARD.encode(&self.0))
    }

    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let inner = text
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .ok_or_else(|| ValueError::InvalidBinary(text.to_string()))?;
        let bytes = STANDARD
            .decode(inner)
            .map_err(|e| ValueError::InvalidBinary(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl fmt::Debug for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Binary({}b)", self.0.len())
    }
}
