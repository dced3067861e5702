//! Core domain types for the endpoint catalog.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use encoding_rs::Encoding;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// HttpMethod
// ---------------------------------------------------------------------------

/// HTTP verbs a documented REST operation can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Whether example invocations for this verb carry their parameters in the
    /// query string (`--url`) rather than a JSON body (`--data`).
    pub fn uses_query_string(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported HTTP method '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Param
// ---------------------------------------------------------------------------

/// A documented parameter of an endpoint.
///
/// Optional fields stay `None` when the documentation section lacks them; they are
/// omitted from the persisted JSON rather than written as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Param {
    /// A parameter known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: None,
            description: None,
            default: None,
        }
    }

    /// The `{name}` token that stands in for this parameter in a command template.
    pub fn placeholder(&self) -> String {
        format!("{{{}}}", self.name)
    }
}

// ---------------------------------------------------------------------------
// Endpoint records
// ---------------------------------------------------------------------------

/// One endpoint as found in the reference document, before templating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEndpoint {
    pub name: String,
    pub http_method: HttpMethod,
    pub path: String,
    pub description: String,
    pub params: Vec<Param>,
    /// Example invocation exactly as documented.
    pub command: String,
}

/// A cataloged endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    /// Unique key within the catalog.
    pub name: String,
    pub http_method: HttpMethod,
    pub path: String,
    pub description: String,
    #[serde(default)]
    pub params: Vec<Param>,
    /// Templated invocation with `{param}` placeholders.
    pub command: String,
    /// SHA-256 hex digest of the documented content (see `jirest_core::fingerprint`).
    pub digest: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The set of cataloged endpoints, keyed by name.
///
/// Serializes as a JSON object `{ "<name>": { ...record... } }`. Insertion order is
/// kept for stable output but equality ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: IndexMap<String, EndpointRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its own name, replacing any previous record with that name.
    pub fn insert(&mut self, record: EndpointRecord) -> Option<EndpointRecord> {
        self.entries.insert(record.name.clone(), record)
    }

    pub fn get(&self, name: &str) -> Option<&EndpointRecord> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EndpointRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Same key set and the same digest for every key.
    pub fn is_equivalent(&self, other: &Catalog) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, record)| other.get(name).is_some_and(|o| o.digest == record.digest))
    }
}

impl FromIterator<EndpointRecord> for Catalog {
    fn from_iter<I: IntoIterator<Item = EndpointRecord>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for record in iter {
            catalog.insert(record);
        }
        catalog
    }
}

// ---------------------------------------------------------------------------
// RawDocument
// ---------------------------------------------------------------------------

/// Undecoded reference document plus the character encoding it was served with.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub encoding: &'static Encoding,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Vec<u8>>, encoding: &'static Encoding) -> Self {
        Self {
            bytes: bytes.into(),
            encoding,
        }
    }

    /// A UTF-8 document, mostly for tests and local files.
    pub fn utf8(text: impl Into<String>) -> Self {
        Self::new(text.into().into_bytes(), encoding_rs::UTF_8)
    }

    /// Decode the markup. Malformed sequences become U+FFFD.
    pub fn decode(&self) -> Cow<'_, str> {
        let (text, _, _) = self.encoding.decode(&self.bytes);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, digest: &str) -> EndpointRecord {
        EndpointRecord {
            name: name.into(),
            http_method: HttpMethod::Get,
            path: format!("/rest/api/3/{name}"),
            description: String::new(),
            params: vec![],
            command: String::new(),
            digest: digest.into(),
        }
    }

    #[test]
    fn http_method_parses_and_displays() {
        for m in ["GET", "POST", "PUT", "PATCH", "DELETE"] {
            let parsed: HttpMethod = m.parse().expect("parse method");
            assert_eq!(parsed.to_string(), m);
        }
        assert!("HEAD".parse::<HttpMethod>().is_err());
        assert!("get".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn param_omits_absent_fields() {
        let param = Param {
            param_type: Some("string".into()),
            ..Param::named("issueIdOrKey")
        };
        let json = serde_json::to_string(&param).expect("serialize");
        assert_eq!(json, r#"{"name":"issueIdOrKey","type":"string"}"#);
    }

    #[test]
    fn param_null_fields_read_as_absent() {
        let json = r#"{"name":"expand","type":null,"description":null,"default":null}"#;
        let param: Param = serde_json::from_str(json).expect("deserialize");
        assert_eq!(param, Param::named("expand"));
    }

    #[test]
    fn catalog_serializes_keyed_by_name() {
        let catalog: Catalog = [record("Get issue", "aa")].into_iter().collect();
        let value = serde_json::to_value(&catalog).expect("serialize");
        assert_eq!(value["Get issue"]["http_method"], "GET");
        assert_eq!(value["Get issue"]["digest"], "aa");
    }

    #[test]
    fn catalog_equality_ignores_order() {
        let a: Catalog = [record("a", "1"), record("b", "2")].into_iter().collect();
        let b: Catalog = [record("b", "2"), record("a", "1")].into_iter().collect();
        assert_eq!(a, b);
        assert!(a.is_equivalent(&b));
    }

    #[test]
    fn equivalence_compares_digests_only() {
        let a: Catalog = [record("a", "1")].into_iter().collect();
        let mut other = record("a", "1");
        other.description = "changed wording, same digest".into();
        let b: Catalog = [other].into_iter().collect();
        assert!(a.is_equivalent(&b));

        let c: Catalog = [record("a", "2")].into_iter().collect();
        assert!(!a.is_equivalent(&c));
    }

    #[test]
    fn raw_document_decodes_with_its_encoding() {
        let doc = RawDocument::new(vec![0x63, 0x61, 0x66, 0xe9], encoding_rs::WINDOWS_1252);
        assert_eq!(doc.decode(), "café");
    }
}
