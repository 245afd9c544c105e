use super::{json_pretty, load_resource, EXIT_SUCCESS};
use std::path::Path;

pub fn run(file: &Path, json: bool) -> Result<u8, String> {
    let (resource, spec) = load_resource(file)?;

    if json {
        println!("{}", json_pretty(&spec)?);
    } else {
        println!("resource file is valid");
        if let Some(ref name) = resource.name {
            println!("name:    {name}");
        }
        println!("url:     {}", spec.url);
        println!("method:  {}", spec.method);
        println!("payload: {} bytes", spec.payload.len());
        if spec.headers.is_empty() {
            println!("headers: (none)");
        } else {
            println!("headers:");
            for (k, v) in &spec.headers {
                println!("  {k}: {v}");
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
