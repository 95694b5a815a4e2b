//! Resources command - list the resource types a set of CRDs defines

use console::style;
use std::path::PathBuf;

use super::{GlobalOptions, print_json};
use crate::error::Result;

pub fn run(options: &GlobalOptions, crds: &[PathBuf], json: bool) -> Result<()> {
    let provider = options.load_provider(crds)?;

    if json {
        let names: Vec<&str> = provider.metadata().collect();
        return print_json(&serde_json::to_value(names)?);
    }

    for name in provider.metadata() {
        if let Some(schema) = provider.schema(name) {
            println!(
                "{}  {}",
                style(name).cyan(),
                style(format!("{} {}", schema.api_version(), schema.kind)).dim()
            );
        }
    }
    Ok(())
}
