use std::fmt;

use crate::binary::Binary;
use crate::error::ValueError;
use crate::moment::Moment;
use crate::name::Name;
use crate::tag::Tag;
use crate::version::Version;

/// One cell of a catalog. `Catalog` nests through `Value::Catalog` rather
/// than through dedicated per-document types — spec.md §9 ("catalog-as-
/// universal-value") asks for exactly one generic ordered catalog type with
/// typed accessors built on top of it, not a struct per document kind.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Tag(Tag),
    Version(Version),
    Moment(Moment),
    Binary(Binary),
    Name(Name),
    /// Arbitrary opaque textual content — the catch-all for "any component"
    /// that is not itself one of the three catalog-shaped document kinds.
    Text(String),
    Catalog(Box<Catalog>),
    /// The `none` sentinel: a first-class inhabitant distinct from a missing
    /// attribute (spec.md §3, §9's Open Question).
    None,
}

impl From<Tag> for Value {
    fn from(v: Tag) -> Self {
        Value::Tag(v)
    }
}
impl From<Version> for Value {
    fn from(v: Version) -> Self {
        Value::Version(v)
    }
}
impl From<Moment> for Value {
    fn from(v: Moment) -> Self {
        Value::Moment(v)
    }
}
impl From<Binary> for Value {
    fn from(v: Binary) -> Self {
        Value::Binary(v)
    }
}
impl From<Name> for Value {
    fn from(v: Name) -> Self {
        Value::Name(v)
    }
}
impl From<Catalog> for Value {
    fn from(v: Catalog) -> Self {
        Value::Catalog(Box::new(v))
    }
}

/// An ordered attribute/parameter catalog: the framework's universal value
/// shape (spec.md §3, §6, §9). Both attribute and parameter lists preserve
/// insertion order, and structural equality over that order is exactly the
/// catalog's equality — reordering two catalogs with identical contents
/// produces a value `citationMatches` (in `notary-core`) will reject.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Catalog {
    attributes: Vec<(String, Value)>,
    parameters: Vec<(String, Value)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_parameter(name, value);
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| n == &name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.parameters.iter_mut().find(|(n, _)| n == &name) {
            Some(slot) => slot.1 = value,
            None => self.parameters.push((name, value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn require_attribute(&self, name: &str) -> Result<&Value, ValueError> {
        self.attribute(name)
            .ok_or_else(|| ValueError::MissingAttribute(name.to_string()))
    }

    pub fn require_parameter(&self, name: &str) -> Result<&Value, ValueError> {
        self.parameter(name)
            .ok_or_else(|| ValueError::MissingParameter(name.to_string()))
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(n, _)| n.as_str())
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|(n, _)| n.as_str())
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Builds a new catalog containing only the named attributes, in the
    /// order requested — used by `notary-core` to reproduce the exact
    /// ordered subset a signature was computed over (spec.md §4.2
    /// `validDocument`: "the document with only {...} (in that order)").
    pub fn select_attributes(&self, names: &[&str]) -> Result<Catalog, ValueError> {
        let mut out = Catalog::new();
        for name in names {
            let value = self.require_attribute(name)?.clone();
            out.attributes.push((name.to_string(), value));
        }
        Ok(out)
    }

    pub fn to_canonical_text(&self) -> String {
        let mut buf = String::new();
        write_catalog(self, &mut buf, 0);
        buf
    }

    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        self.to_canonical_text().into_bytes()
    }

    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let mut parser = Parser::new(text);
        let catalog = parser.parse_catalog()?;
        parser.skip_ws();
        if parser.pos != parser.chars.len() {
            return Err(ValueError::Malformed {
                offset: parser.pos,
                reason: "trailing content after catalog".to_string(),
            });
        }
        Ok(catalog)
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_text())
    }
}

// ── Canonical writer ───────────────────────────────────────────────────────

fn write_catalog(catalog: &Catalog, buf: &mut String, indent: usize) {
    let pad = "    ".repeat(indent + 1);
    let closing_pad = "    ".repeat(indent);

    buf.push_str("[\n");
    for (name, value) in &catalog.attributes {
        buf.push_str(&pad);
        buf.push_str(name);
        buf.push_str(": ");
        write_value(value, buf, indent + 1);
        buf.push('\n');
    }
    buf.push_str(&closing_pad);
    buf.push(']');

    if !catalog.parameters.is_empty() {
        buf.push_str("(\n");
        for (name, value) in &catalog.parameters {
            buf.push_str(&pad);
            buf.push_str(name);
            buf.push_str(": ");
            write_value(value, buf, indent + 1);
            buf.push('\n');
        }
        buf.push_str(&closing_pad);
        buf.push(')');
    }
}

fn write_value(value: &Value, buf: &mut String, indent: usize) {
    match value {
        Value::Tag(t) => buf.push_str(&t.to_text()),
        Value::Version(v) => buf.push_str(&v.to_text()),
        Value::Moment(m) => buf.push_str(&m.to_text()),
        Value::Binary(b) => buf.push_str(&b.to_text()),
        Value::Name(n) => buf.push_str(n.as_str()),
        Value::Text(s) => {
            buf.push('"');
            buf.push_str(&s.replace('"', "\"\""));
            buf.push('"');
        }
        Value::Catalog(c) => write_catalog(c, buf, indent),
        Value::None => buf.push_str("none"),
    }
}

// ── Parser ───────────────────────────────────────────────────────────────────

const STOP_CHARS: [char; 5] = [',', ']', ')', '(', '['];

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self { chars: text.chars().collect(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ValueError> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            other => Err(ValueError::Malformed {
                offset: self.pos,
                reason: format!("expected '{expected}', got {other:?}"),
            }),
        }
    }

    fn parse_catalog(&mut self) -> Result<Catalog, ValueError> {
        self.skip_ws();
        self.expect('[')?;
        let attributes = self.parse_pairs(']')?;
        self.expect(']')?;

        self.skip_ws();
        let mut parameters = Vec::new();
        if self.peek() == Some('(') {
            self.advance();
            parameters = self.parse_pairs(')')?;
            self.expect(')')?;
        }

        Ok(Catalog { attributes, parameters })
    }

    fn parse_pairs(&mut self, terminator: char) -> Result<Vec<(String, Value)>, ValueError> {
        let mut pairs = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(terminator) {
                return Ok(pairs);
            }
            let name = self.parse_attribute_name()?;
            self.skip_ws();
            self.expect(':')?;
            self.skip_ws();
            let value = self.parse_value()?;
            pairs.push((name, value));
            self.skip_ws();
            if self.peek() == Some(',') {
                self.advance();
            }
        }
    }

    fn parse_attribute_name(&mut self) -> Result<String, ValueError> {
        if self.peek() != Some('$') {
            return Err(ValueError::ExpectedAttributeName(
                self.peek().map(String::from).unwrap_or_default(),
            ));
        }
        let mut name = String::new();
        name.push(self.advance().unwrap());
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            name.push(self.advance().unwrap());
        }
        Ok(name)
    }

    fn read_token(&mut self) -> String {
        let mut token = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || STOP_CHARS.contains(&c) {
                break;
            }
            token.push(c);
            self.pos += 1;
        }
        token
    }

    fn read_delimited(&mut self, close: char) -> Result<String, ValueError> {
        let start = self.pos;
        let mut token = String::new();
        token.push(self.advance().unwrap()); // opening delimiter
        loop {
            match self.advance() {
                Some(c) if c == close => {
                    token.push(c);
                    return Ok(token);
                }
                Some(c) => token.push(c),
                None => return Err(ValueError::Unterminated { offset: start }),
            }
        }
    }

    fn read_quoted_text(&mut self) -> Result<String, ValueError> {
        let start = self.pos;
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => {
                    if self.peek() == Some('"') {
                        self.advance();
                        text.push('"');
                    } else {
                        return Ok(text);
                    }
                }
                Some(c) => text.push(c),
                None => return Err(ValueError::Unterminated { offset: start }),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, ValueError> {
        self.skip_ws();
        match self.peek() {
            Some('[') => Ok(Value::Catalog(Box::new(self.parse_catalog()?))),
            Some('#') => Ok(Value::Tag(Tag::parse(&self.read_token())?)),
            Some('\'') => {
                let token = self.read_delimited('\'')?;
                Ok(Value::Binary(Binary::parse(&token)?))
            }
            Some('<') => {
                let token = self.read_delimited('>')?;
                Ok(Value::Moment(Moment::parse(&token)?))
            }
            Some('/') => Ok(Value::Name(Name::parse(&self.read_token())?)),
            Some('"') => Ok(Value::Text(self.read_quoted_text()?)),
            Some('v') if matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) => {
                Ok(Value::Version(Version::parse(&self.read_token())?))
            }
            Some('n') => {
                let token = self.read_token();
                if token == "none" {
                    Ok(Value::None)
                } else {
                    Err(ValueError::Malformed {
                        offset: self.pos,
                        reason: format!("unrecognized value token {token:?}"),
                    })
                }
            }
            other => Err(ValueError::Malformed {
                offset: self.pos,
                reason: format!("unrecognized value starting with {other:?}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_citation() -> Catalog {
        Catalog::new()
            .with_attribute("$protocol", Value::Version(Version::initial()))
            .with_attribute("$timestamp", Value::Moment(Moment::now()))
            .with_attribute("$tag", Value::Tag(Tag::generate()))
            .with_attribute("$version", Value::Version(Version::initial()))
            .with_attribute("$digest", Value::Binary(Binary::new(vec![1, 2, 3])))
            .with_parameter("$type", Value::Name(Name::parse("/bali/notary/Citation/v2").unwrap()))
    }

    #[test]
    fn round_trips_a_flat_catalog() {
        let cat = sample_citation();
        let text = cat.to_canonical_text();
        let parsed = Catalog::parse(&text).unwrap();
        assert_eq!(cat, parsed);
    }

    #[test]
    fn round_trips_a_nested_catalog_with_none() {
        let inner = sample_citation();
        let outer = Catalog::new()
            .with_attribute("$component", Value::Text("hello world".to_string()))
            .with_attribute("$certificate", Value::Catalog(Box::new(inner.clone())))
            .with_attribute("$previous", Value::None)
            .with_parameter("$type", Value::Name(Name::parse("/bali/notary/Document/v2").unwrap()));
        let parsed = Catalog::parse(&outer.to_canonical_text()).unwrap();
        assert_eq!(outer, parsed);
        assert_eq!(parsed.attribute("$certificate"), Some(&Value::Catalog(Box::new(inner))));
    }

    #[test]
    fn reordering_breaks_equality() {
        let a = Catalog::new().with_attribute("$a", Value::None).with_attribute("$b", Value::None);
        let b = Catalog::new().with_attribute("$b", Value::None).with_attribute("$a", Value::None);
        assert_ne!(a, b);
        assert_ne!(a.to_canonical_text(), b.to_canonical_text());
    }

    #[test]
    fn select_attributes_preserves_requested_order() {
        let cat = sample_citation();
        let subset = cat.select_attributes(&["$tag", "$protocol"]).unwrap();
        assert_eq!(subset.attribute_names().collect::<Vec<_>>(), vec!["$tag", "$protocol"]);
    }

    #[test]
    fn text_values_escape_embedded_quotes() {
        let cat = Catalog::new().with_attribute("$note", Value::Text("say \"hi\"".to_string()));
        let parsed = Catalog::parse(&cat.to_canonical_text()).unwrap();
        assert_eq!(parsed.attribute("$note"), Some(&Value::Text("say \"hi\"".to_string())));
    }
}
