use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read resource file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse resource file: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported resource_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("request.url must not be empty")]
    EmptyUrl,
    #[error("request.url is not a valid http(s) URL: '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request.method must be GET|POST|PUT|PATCH|DELETE|HEAD, got: '{0}'")]
    InvalidMethod(String),
    #[error("header name must not be empty")]
    EmptyHeaderName,
}

/// A declared HTTP resource, version 1.
///
/// The declaration names a request to apply against an external endpoint.
/// `normalize()` turns it into a validated [`Specification`](crate::Specification).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResourceV1 {
    pub resource_version: u32,
    /// Optional host-side name the record is stored under.
    #[serde(default)]
    pub name: Option<String>,
    pub request: RequestSection,
    #[serde(default)]
    pub headers: HeadersSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RequestSection {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub payload: String,
}

/// Extra request headers. An absent `[headers]` table and an empty one are
/// equivalent: both mean "send no extra headers".
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct HeadersSection {
    #[serde(flatten)]
    pub entries: BTreeMap<String, String>,
}

pub fn parse_resource_str(input: &str) -> Result<ResourceV1, SpecError> {
    Ok(toml::from_str(input)?)
}

pub fn parse_resource_file(path: impl AsRef<Path>) -> Result<ResourceV1, SpecError> {
    let content = fs::read_to_string(path)?;
    parse_resource_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_declaration() {
        let input = r#"
resource_version = 1
name = "widget-sync"

[request]
url = "https://api.example.com/widgets"
method = "POST"
payload = '{"n":1}'

[headers]
X-Key = "abc"
"#;
        let resource = parse_resource_str(input).unwrap();
        assert_eq!(resource.resource_version, 1);
        assert_eq!(resource.name.as_deref(), Some("widget-sync"));
        assert_eq!(resource.request.url, "https://api.example.com/widgets");
        assert_eq!(resource.request.method, "POST");
        assert_eq!(resource.request.payload, r#"{"n":1}"#);
        assert_eq!(resource.headers.entries.get("X-Key").unwrap(), "abc");
    }

    #[test]
    fn payload_and_headers_default_to_empty() {
        let input = r#"
resource_version = 1
[request]
url = "https://example.com"
method = "GET"
"#;
        let resource = parse_resource_str(input).unwrap();
        assert!(resource.request.payload.is_empty());
        assert!(resource.headers.entries.is_empty());
        assert!(resource.name.is_none());
    }

    #[test]
    fn rejects_unknown_request_fields() {
        let input = r#"
resource_version = 1
[request]
url = "https://example.com"
method = "GET"
body = "typo"
"#;
        assert!(parse_resource_str(input).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = parse_resource_file("/nonexistent/resource.toml").unwrap_err();
        assert!(matches!(err, SpecError::Io(_)));
    }
}
