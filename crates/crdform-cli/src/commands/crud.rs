//! Create / read / update / delete commands

use console::style;
use std::path::Path;

use super::{GlobalOptions, print_json, read_state, select_type};
use crate::error::Result;

/// Which CRUD operation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

pub async fn run(
    options: &GlobalOptions,
    operation: Operation,
    crd: &Path,
    state_path: &Path,
    type_name: Option<&str>,
) -> Result<()> {
    let state = read_state(state_path)?;
    let provider = options.configured_provider(crd).await?;
    let type_name = select_type(&provider, type_name)?;
    let resource = provider.resource(&type_name)?;

    tracing::debug!(?operation, resource = %type_name, "running");

    let result = match operation {
        Operation::Create => resource.create(&state).await?,
        Operation::Read => resource.read(&state).await?,
        Operation::Update => resource.update(&state).await?,
        Operation::Delete => {
            resource.delete(&state).await?;
            eprintln!(
                "{} Deleted {}",
                style("✓").green().bold(),
                state
                    .get("id")
                    .and_then(|id| id.as_str())
                    .unwrap_or(type_name.as_str())
            );
            return Ok(());
        }
    };

    print_json(&result)
}
