//! Import command - build the initial state for an existing object

use std::path::Path;

use super::{GlobalOptions, print_json, select_type};
use crate::error::Result;

pub fn run(options: &GlobalOptions, crd: &Path, id: &str, type_name: Option<&str>) -> Result<()> {
    let provider = options.load_provider(&[crd.to_path_buf()])?;
    let type_name = select_type(&provider, type_name)?;
    let state = provider.resource(&type_name)?.import_state(id)?;
    print_json(&state)
}
