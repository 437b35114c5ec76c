use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::ValueError;

/// The framework's timestamp scalar. Textual form is `<RFC3339 millis, Z>`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Moment(DateTime<Utc>);

impl Moment {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn to_text(&self) -> String {
        format!("<{}>", self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let inner = text
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .ok_or_else(|| ValueError::InvalidMoment(text.to_string()))?;
        let dt = DateTime::parse_from_rfc3339(inner)
            .map_err(|e| ValueError::InvalidMoment(e.to_string()))?;
        Ok(Self(dt.with_timezone(&Utc)))
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl fmt::Debug for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Moment({})", self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_text() {
        let m = Moment::now();
        let parsed = Moment::parse(&m.to_text()).unwrap();
        // Millisecond precision is preserved by RFC3339-with-millis.
        assert_eq!(m.to_text(), parsed.to_text());
    }

    #[test]
    fn rejects_missing_brackets() {
        assert!(Moment::parse("2024-01-01T00:00:00.000Z").is_err());
    }
}
