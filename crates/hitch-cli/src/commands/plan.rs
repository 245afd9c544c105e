use super::{colorize_verdict, json_pretty, load_resource, resolve_name, EXIT_SUCCESS};
use hitch_engine::{changes, decide, Verdict};
use hitch_state::{RecordStore, StateError, StateLayout};
use std::path::Path;

pub fn run(
    state_path: &Path,
    file: &Path,
    name_flag: Option<&str>,
    json: bool,
) -> Result<u8, String> {
    let (resource, spec) = load_resource(file)?;
    let name = resolve_name(file, name_flag, &resource)?;

    let layout = StateLayout::new(state_path);
    layout.initialize().map_err(|e| format!("state error: {e}"))?;
    let store = RecordStore::new(layout);
    let previous = match store.get(&name) {
        Ok(record) => Some(record),
        Err(StateError::RecordNotFound(_)) => None,
        Err(e) => return Err(format!("state error: {e}")),
    };

    let verdict = decide(&spec, previous.as_ref());

    if json {
        let payload = match (verdict, previous.as_ref()) {
            (Verdict::Changed, Some(record)) => serde_json::json!({
                "name": name,
                "verdict": verdict,
                "changes": changes(&spec, record),
            }),
            _ => serde_json::json!({
                "name": name,
                "verdict": verdict,
            }),
        };
        println!("{}", json_pretty(&payload)?);
        return Ok(EXIT_SUCCESS);
    }

    match verdict {
        Verdict::NoPriorState => {
            println!(
                "{}: {}, apply would issue {} {}",
                name,
                colorize_verdict("no prior state"),
                spec.method,
                spec.url
            );
        }
        Verdict::Unchanged => {
            println!("{}: {}, apply would do nothing", name, colorize_verdict("unchanged"));
        }
        Verdict::Changed => {
            println!("{}: {}, apply would redo the request", name, colorize_verdict("changed"));
            if let Some(ref record) = previous {
                let set = changes(&spec, record);
                if set.url {
                    println!("  ~ url: {} -> {}", record.url, spec.url);
                }
                if set.method {
                    println!("  ~ method: {} -> {}", record.method, spec.method);
                }
                if set.payload {
                    println!("  ~ payload");
                }
                if set.headers {
                    println!("  ~ headers");
                }
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
