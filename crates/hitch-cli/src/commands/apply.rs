use super::{json_pretty, load_resource, resolve_name, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use hitch_engine::{Outcome, Reconciler};
use hitch_state::{RecordStore, StateError, StateLayout, StateLock};
use hitch_transport::HttpTransport;
use std::path::Path;
use std::time::Duration;

#[allow(clippy::too_many_lines)]
pub fn run(
    state_path: &Path,
    file: &Path,
    name_flag: Option<&str>,
    timeout: Option<u64>,
    json: bool,
) -> Result<u8, String> {
    let (resource, spec) = load_resource(file)?;
    let name = resolve_name(file, name_flag, &resource)?;

    let layout = StateLayout::new(state_path);
    layout.initialize().map_err(|e| format!("state error: {e}"))?;
    // Serialize apply cycles across host processes; the engine itself does
    // not coordinate concurrent applies of the same resource.
    let _lock = StateLock::acquire(&layout.lock_file()).map_err(|e| format!("state lock: {e}"))?;

    let store = RecordStore::new(layout);
    let previous = match store.get(&name) {
        Ok(record) => Some(record),
        Err(StateError::RecordNotFound(_)) => None,
        Err(e) => return Err(format!("state error: {e}")),
    };

    let transport = HttpTransport::with_timeout(timeout.map(Duration::from_secs));
    let reconciler = Reconciler::new(&transport);

    let pb = if json {
        None
    } else {
        Some(spinner(&format!("applying {name}...")))
    };

    let outcome = match reconciler.reconcile(&spec, previous.as_ref()) {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "apply failed");
            }
            return Err(format!("apply failed: {e}"));
        }
    };

    match outcome {
        Outcome::Unchanged => {
            if let Some(ref pb) = pb {
                spin_ok(pb, &format!("{name} unchanged"));
            }
            if json {
                let payload = serde_json::json!({
                    "name": name,
                    "status": "unchanged",
                });
                println!("{}", json_pretty(&payload)?);
            } else {
                println!("no changes, nothing to apply");
            }
        }
        Outcome::Applied(record) => {
            store
                .put(&name, &record)
                .map_err(|e| format!("state error: {e}"))?;
            if let Some(ref pb) = pb {
                spin_ok(pb, &format!("{name} applied"));
            }
            if json {
                let payload = serde_json::json!({
                    "name": name,
                    "status": "applied",
                    "id": record.id,
                    "status_code": record.status_code,
                    "response_body": record.response_body,
                });
                println!("{}", json_pretty(&payload)?);
            } else {
                println!("applied {} {}", record.method, record.url);
                println!("id:          {}", record.id);
                println!("status_code: {}", record.status_code);
                println!("response:    {}", record.response_body);
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
