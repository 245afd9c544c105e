use crate::spec::{Method, Specification};
use crate::types::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Durable outcome of the last successful apply of a resource.
///
/// A record exists only after at least one exchange returned status 200; a
/// failed exchange never produces or modifies one. Records are replaced
/// wholesale on re-apply and removed only by an explicit destroy.
///
/// The specification fields (`url`, `method`, `payload`, `headers`) are
/// echoed from the declaration that produced this record: the next cycle's
/// diff compares against these, not against whatever the caller holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub id: ResourceId,
    pub url: String,
    pub method: Method,
    pub payload: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Response bytes decoded as text (lossy UTF-8).
    pub response_body: String,
    /// Always 200 in a persisted record.
    pub status_code: u16,
    pub created_at: String,
    pub updated_at: String,
    /// blake3 checksum embedded by the record store. `None` for records not
    /// yet persisted and for legacy files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl Record {
    /// Reconstruct the specification this record was applied from.
    pub fn applied_spec(&self) -> Specification {
        Specification {
            url: self.url.clone(),
            method: self.method,
            payload: self.payload.clone(),
            headers: self.headers.clone(),
        }
    }
}
