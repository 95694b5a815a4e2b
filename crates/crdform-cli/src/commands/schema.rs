//! Schema command - show the attribute tree built from a CRD

use std::path::Path;

use super::{GlobalOptions, print_json};
use crate::display;
use crate::error::{CliError, Result};

pub fn run(options: &GlobalOptions, crd: &Path, type_name: Option<&str>, json: bool) -> Result<()> {
    let provider = options.load_provider(&[crd.to_path_buf()])?;

    let selected: Vec<&str> = match type_name {
        Some(name) => vec![name],
        None => provider.metadata().collect(),
    };

    let mut schemas = Vec::with_capacity(selected.len());
    for name in selected {
        let schema = provider.schema(name).ok_or_else(|| {
            CliError::usage_with_help(
                format!("unknown resource type '{}'", name),
                "Run `crdform resources <crd>` to list available types",
            )
        })?;
        schemas.push(&**schema);
    }

    if json {
        let value = serde_json::to_value(&schemas)?;
        return print_json(&value);
    }

    for (i, schema) in schemas.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", display::schema_tree(schema));
    }
    Ok(())
}
