//! Plain-text CPMP instance writer (inverse of [`crate::reader`]).

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use cpmp_core::Instance;

/// Render an instance in the reader's layout.
pub fn format_instance(instance: &Instance) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", instance.nlocations(), instance.nclusters());
    for row in instance.distances() {
        push_row(&mut out, row);
    }
    push_row(&mut out, instance.demands());
    push_row(&mut out, instance.capacities());
    out
}

pub fn write_instance(instance: &Instance, path: &Path) -> Result<()> {
    fs::write(path, format_instance(instance))
        .with_context(|| format!("writing CPMP instance: {}", path.display()))
}

fn push_row(out: &mut String, values: &[u64]) {
    let line = values
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&line);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_layout() {
        let inst = Instance::new(1, vec![vec![0, 3], vec![4, 0]], vec![1, 2], vec![3, 3]).unwrap();
        assert_eq!(format_instance(&inst), "2 1\n0 3\n4 0\n1 2\n3 3\n");
    }
}
