//! Resource declarations, normalized specifications, and applied records for hitch.
//!
//! This crate defines the data model shared by the engine and the host: TOML
//! resource file parsing (`ResourceV1`), the normalized desired state
//! (`Specification`) with method and URL validation, and the durable outcome
//! of a successful apply (`Record`).

pub mod record;
pub mod resource;
pub mod spec;
pub mod types;

pub use record::Record;
pub use resource::{
    parse_resource_file, parse_resource_str, HeadersSection, RequestSection, ResourceV1, SpecError,
};
pub use spec::{Method, Specification};
pub use types::ResourceId;
