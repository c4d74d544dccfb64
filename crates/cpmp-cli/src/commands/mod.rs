pub mod completions;
pub mod inspect;
pub mod solve;

#[cfg(feature = "solver-clarabel")]
pub mod bound;

use std::path::Path;

use anyhow::{bail, Context, Result};
use cpmp_core::Instance;

/// Read an instance file, with the path in the error chain.
pub fn load_instance(path: &Path) -> Result<Instance> {
    if !path.exists() {
        bail!("Instance '{}' does not exist", path.display());
    }
    cpmp_io::read_instance(path).with_context(|| format!("loading {}", path.display()))
}
