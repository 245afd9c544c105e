pub mod apply;
pub mod completions;
pub mod destroy;
pub mod list;
pub mod plan;
pub mod show;
pub mod validate;

use hitch_spec::{ResourceV1, Specification};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_SPEC_ERROR: u8 = 2;
pub const EXIT_APPLY_ERROR: u8 = 3;
pub const EXIT_STATE_ERROR: u8 = 4;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Parse and normalize a resource file. Parse errors keep their
/// "failed to ..." prefixes; normalization errors get the
/// "invalid specification:" prefix so main() can map the exit code.
pub fn load_resource(file: &Path) -> Result<(ResourceV1, Specification), String> {
    let resource = hitch_spec::parse_resource_file(file).map_err(|e| e.to_string())?;
    let spec = resource
        .normalize()
        .map_err(|e| format!("invalid specification: {e}"))?;
    Ok((resource, spec))
}

/// Resolve the record name: `--name` flag, then the file's `name` field,
/// then the file stem.
pub fn resolve_name(
    file: &Path,
    flag: Option<&str>,
    resource: &ResourceV1,
) -> Result<String, String> {
    if let Some(n) = flag {
        return Ok(n.to_owned());
    }
    if let Some(ref n) = resource.name {
        return Ok(n.clone());
    }
    file.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .ok_or_else(|| format!("cannot derive a record name from '{}'", file.display()))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn colorize_verdict(verdict: &str) -> String {
    match verdict {
        "unchanged" => console::style(verdict).green().to_string(),
        "changed" => console::style(verdict).yellow().to_string(),
        "no prior state" => console::style(verdict).cyan().to_string(),
        other => other.to_owned(),
    }
}
