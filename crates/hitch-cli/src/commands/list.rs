use super::{json_pretty, EXIT_SUCCESS};
use hitch_state::{RecordStore, StateLayout};
use std::path::Path;

pub fn run(state_path: &Path, json: bool) -> Result<u8, String> {
    let layout = StateLayout::new(state_path);
    layout.initialize().map_err(|e| format!("state error: {e}"))?;
    let store = RecordStore::new(layout);
    let records = store.list().map_err(|e| format!("state error: {e}"))?;

    if json {
        let payload: Vec<serde_json::Value> = records
            .iter()
            .map(|(name, record)| {
                serde_json::json!({
                    "name": name,
                    "id": record.id,
                    "method": record.method,
                    "url": record.url,
                    "updated_at": record.updated_at,
                })
            })
            .collect();
        println!("{}", json_pretty(&payload)?);
    } else if records.is_empty() {
        println!("no records found");
    } else {
        println!("{:<24} {:<8} URL", "NAME", "METHOD");
        for (name, record) in &records {
            println!("{:<24} {:<8} {}", name, record.method.as_str(), record.url);
        }
    }
    Ok(EXIT_SUCCESS)
}
