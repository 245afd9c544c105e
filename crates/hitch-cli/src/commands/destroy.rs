use super::{json_pretty, EXIT_SUCCESS};
use hitch_state::{RecordStore, StateLayout, StateLock};
use std::path::Path;

/// Destroying a resource discards its record. The external endpoint is
/// never contacted — there is no contract for what "delete" means to an
/// arbitrary HTTP endpoint.
pub fn run(state_path: &Path, name: &str, json: bool) -> Result<u8, String> {
    let layout = StateLayout::new(state_path);
    layout.initialize().map_err(|e| format!("state error: {e}"))?;
    let _lock = StateLock::acquire(&layout.lock_file()).map_err(|e| format!("state lock: {e}"))?;

    let store = RecordStore::new(layout);
    let existed = store.exists(name);
    store.remove(name).map_err(|e| format!("state error: {e}"))?;

    if json {
        let payload = serde_json::json!({
            "name": name,
            "status": if existed { "destroyed" } else { "absent" },
        });
        println!("{}", json_pretty(&payload)?);
    } else if existed {
        println!("destroyed record '{name}'");
    } else {
        println!("no record named '{name}'");
    }
    Ok(EXIT_SUCCESS)
}
