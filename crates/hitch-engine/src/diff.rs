use hitch_spec::{Record, Specification};
use serde::Serialize;

/// Whether a reconciliation cycle needs to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// No record exists yet: first reconciliation for this resource.
    NoPriorState,
    /// The record's echoed fields match the desired specification exactly;
    /// nothing is sent and nothing is persisted.
    Unchanged,
    /// At least one observable request input differs; the whole request is
    /// redone. There is no partial update — the endpoint is opaque.
    Changed,
}

/// Per-field comparison of a desired specification against the echoed
/// fields of the last applied record.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChangeSet {
    pub url: bool,
    pub method: bool,
    pub payload: bool,
    pub headers: bool,
}

impl ChangeSet {
    pub fn has_changes(self) -> bool {
        self.url || self.method || self.payload || self.headers
    }
}

/// Compare field by field. Header comparison is full mapping equality: same
/// key set, same value per key, case preserved. Absent headers normalize to
/// an empty map before they get here, so empty and never-declared compare
/// equal.
pub fn changes(desired: &Specification, previous: &Record) -> ChangeSet {
    ChangeSet {
        url: desired.url != previous.url,
        method: desired.method != previous.method,
        payload: desired.payload != previous.payload,
        headers: desired.headers != previous.headers,
    }
}

/// The one place idempotency is decided. Pure: no I/O, no clock.
pub fn decide(desired: &Specification, previous: Option<&Record>) -> Verdict {
    let Some(record) = previous else {
        return Verdict::NoPriorState;
    };
    if changes(desired, record).has_changes() {
        Verdict::Changed
    } else {
        Verdict::Unchanged
    }
}
