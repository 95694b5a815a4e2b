//! Validate command - check a state document against a resource schema

use std::path::Path;

use super::{GlobalOptions, print_json, read_state, select_type};
use crate::display;
use crate::error::{CliError, Result};

pub fn run(
    options: &GlobalOptions,
    crd: &Path,
    state_path: &Path,
    type_name: Option<&str>,
    json: bool,
) -> Result<()> {
    let provider = options.load_provider(&[crd.to_path_buf()])?;
    let type_name = select_type(&provider, type_name)?;
    let schema = provider.resource(&type_name)?.schema().clone();

    let mut state = read_state(state_path)?;
    schema.apply_defaults(&mut state);
    let issues = schema.validate(&state);

    if json {
        print_json(&serde_json::json!({
            "type": type_name,
            "valid": issues.is_empty(),
            "issues": issues,
        }))?;
    } else {
        display::print_issues(&type_name, &issues);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(CliError::validation(format!(
            "{} issue(s) in {}",
            issues.len(),
            state_path.display()
        )))
    }
}
