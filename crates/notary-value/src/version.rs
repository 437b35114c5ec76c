use std::fmt;

use crate::error::ValueError;

/// The framework's version scalar: a non-empty sequence of dot-separated
/// integers with a `next_version` successor operation (spec.md §3/§6).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Version(Vec<u32>);

impl Version {
    /// The first version of any lineage: `v1`.
    pub fn initial() -> Self {
        Self(vec![1])
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    /// The version immediately after this one, per the framework's ordering
    /// rules: the last component is incremented. Certificates chain through
    /// this operation (spec.md §3's `$version` invariant).
    pub fn next_version(&self) -> Self {
        let mut comps = self.0.clone();
        *comps.last_mut().expect("version is never empty") += 1;
        Self(comps)
    }

    pub fn to_text(&self) -> String {
        let joined = self
            .0
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".");
        format!("v{joined}")
    }

    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let stripped = text
            .strip_prefix('v')
            .ok_or_else(|| ValueError::InvalidVersion(text.to_string()))?;
        if stripped.is_empty() {
            return Err(ValueError::InvalidVersion(text.to_string()));
        }
        let mut comps = Vec::new();
        for part in stripped.split('.') {
            let n: u32 = part
                .parse()
                .map_err(|_| ValueError::InvalidVersion(text.to_string()))?;
            comps.push(n);
        }
        Ok(Self(comps))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({})", self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_is_v1() {
        assert_eq!(Version::initial().to_text(), "v1");
    }

    #[test]
    fn next_version_increments_last_component() {
        assert_eq!(Version::initial().next_version().to_text(), "v2");
        assert_eq!(Version::parse("v1.3").unwrap().next_version().to_text(), "v1.4");
    }

    #[test]
    fn round_trips_through_text() {
        let v = Version::parse("v2.10.1").unwrap();
        assert_eq!(Version::parse(&v.to_text()).unwrap(), v);
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(Version::parse("2.1").is_err());
        assert!(Version::parse("v").is_err());
        assert!(Version::parse("vX").is_err());
    }
}
