use super::{json_pretty, EXIT_SUCCESS};
use hitch_state::{RecordStore, StateLayout};
use std::path::Path;

/// Reading never re-issues the request: the stored record is the source of
/// truth between applies.
pub fn run(state_path: &Path, name: &str, json: bool) -> Result<u8, String> {
    let layout = StateLayout::new(state_path);
    layout.initialize().map_err(|e| format!("state error: {e}"))?;
    let store = RecordStore::new(layout);
    let record = store.get(name).map_err(|e| format!("state error: {e}"))?;

    if json {
        println!("{}", json_pretty(&record)?);
    } else {
        println!("name:        {name}");
        println!("id:          {}", record.id);
        println!("url:         {}", record.url);
        println!("method:      {}", record.method);
        println!("payload:     {} bytes", record.payload.len());
        if record.headers.is_empty() {
            println!("headers:     (none)");
        } else {
            println!("headers:");
            for (k, v) in &record.headers {
                println!("  {k}: {v}");
            }
        }
        println!("status_code: {}", record.status_code);
        println!("response:    {}", record.response_body);
        println!("created_at:  {}", record.created_at);
        println!("updated_at:  {}", record.updated_at);
    }
    Ok(EXIT_SUCCESS)
}
