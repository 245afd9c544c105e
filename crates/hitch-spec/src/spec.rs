use crate::resource::{ResourceV1, SpecError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The HTTP methods a resource declaration may use.
///
/// Anything else is a validation error, rejected before any I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            other => Err(SpecError::InvalidMethod(other.to_owned())),
        }
    }
}

/// Validated, normalized desired state of an external HTTP resource.
///
/// Headers live in a `BTreeMap`: keys are unique by construction and iterate
/// in sorted order, so requests are built deterministically. An absent
/// `[headers]` table normalizes to an empty map — the two are the same state.
/// Key and value case is preserved, never normalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Specification {
    pub url: String,
    pub method: Method,
    pub payload: String,
    pub headers: BTreeMap<String, String>,
}

impl Specification {
    /// Check that the URL is a well-formed http(s) URL.
    ///
    /// `normalize()` already guarantees this for specifications built from a
    /// declaration; callers constructing one directly get the same check at
    /// the start of an apply.
    pub fn validate(&self) -> Result<(), SpecError> {
        validate_url(&self.url)?;
        for name in self.headers.keys() {
            if name.is_empty() {
                return Err(SpecError::EmptyHeaderName);
            }
        }
        Ok(())
    }
}

impl ResourceV1 {
    /// Normalize the declaration: validate the version, URL, and method,
    /// resolve defaults.
    pub fn normalize(&self) -> Result<Specification, SpecError> {
        if self.resource_version != 1 {
            return Err(SpecError::UnsupportedVersion(self.resource_version));
        }

        let url = self.request.url.trim().to_owned();
        validate_url(&url)?;

        let method = Method::from_str(&self.request.method)?;

        for name in self.headers.entries.keys() {
            if name.is_empty() {
                return Err(SpecError::EmptyHeaderName);
            }
        }

        Ok(Specification {
            url,
            method,
            payload: self.request.payload.clone(),
            headers: self.headers.entries.clone(),
        })
    }
}

fn validate_url(raw: &str) -> Result<(), SpecError> {
    if raw.is_empty() {
        return Err(SpecError::EmptyUrl);
    }
    let parsed = url::Url::parse(raw).map_err(|e| SpecError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SpecError::InvalidUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
