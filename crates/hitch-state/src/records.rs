use crate::layout::StateLayout;
use crate::{fsync_dir, StateError};
use hitch_spec::Record;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Validate a host-side resource name: 1-64 chars of `[a-zA-Z0-9_-]`.
/// Names become file names, so anything else is rejected.
pub fn validate_resource_name(name: &str) -> Result<(), StateError> {
    if name.is_empty() || name.len() > 64 {
        return Err(StateError::InvalidName(
            "resource name must be 1-64 characters".to_owned(),
        ));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(StateError::InvalidName(
            "resource name must match [a-zA-Z0-9_-]".to_owned(),
        ));
    }
    Ok(())
}

/// One JSON file per resource name, written atomically with an embedded
/// blake3 checksum that is verified on read.
pub struct RecordStore {
    layout: StateLayout,
}

impl RecordStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    pub fn put(&self, name: &str, record: &Record) -> Result<(), StateError> {
        validate_resource_name(name)?;
        let dest = self.layout.record_path(name);

        // Compute and embed checksum before writing
        let mut stamped = record.clone();
        stamped.checksum = Some(record_checksum(record)?);
        let content = serde_json::to_string_pretty(&stamped)?;

        let dir = self.layout.records_dir();
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| StateError::Io(e.error))?;
        fsync_dir(&dir)?;

        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Record, StateError> {
        let path = self.layout.record_path(name);
        if !path.exists() {
            return Err(StateError::RecordNotFound(name.to_owned()));
        }
        let content = fs::read_to_string(&path)?;
        let record: Record = serde_json::from_str(&content)?;

        // Verify checksum if present (legacy files have none)
        if let Some(ref expected) = record.checksum {
            let actual = record_checksum(&record)?;
            if actual != *expected {
                return Err(StateError::IntegrityFailure {
                    name: name.to_owned(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        Ok(record)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.layout.record_path(name).exists()
    }

    pub fn remove(&self, name: &str) -> Result<(), StateError> {
        let path = self.layout.record_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// All stored records, sorted by name. Corrupt entries are skipped with
    /// a warning so one bad file does not hide the rest.
    pub fn list(&self) -> Result<Vec<(String, Record)>, StateError> {
        let dir = self.layout.records_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut results = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str().and_then(|f| f.strip_suffix(".json")) else {
                continue;
            };
            match self.get(name) {
                Ok(record) => results.push((name.to_owned(), record)),
                Err(e) => {
                    tracing::warn!("skipping corrupted record '{name}': {e}");
                }
            }
        }
        results.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(results)
    }
}

/// Checksum over the record content, excluding the checksum field itself.
fn record_checksum(record: &Record) -> Result<String, StateError> {
    let mut copy = record.clone();
    copy.checksum = None;
    let json = serde_json::to_string_pretty(&copy)?;
    Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
}
