//! Plain-text CPMP instance reader
//!
//! Layout, one block after the other:
//!
//! ```text
//! n p                      header: number of locations, number of clusters
//! d00 d01 ... d0(n-1)      n rows of the distance matrix (row = location)
//! ...
//! q0 q1 ... q(n-1)         demands
//! Q0 Q1 ... Q(n-1)         capacities
//! ```
//!
//! Any line whose first token is not a non-negative integer is skipped, so
//! blank lines and comment lines may appear anywhere between blocks.

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::Path;

use cpmp_core::Instance;

/// Read a CPMP instance from disk.
pub fn read_instance(path: &Path) -> Result<Instance> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading CPMP instance: {}", path.display()))?;
    parse_instance(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Parse instance text.
pub fn parse_instance(content: &str) -> Result<Instance> {
    let mut rows = data_lines(content);

    let (line_no, header) = rows
        .next()
        .ok_or_else(|| anyhow!("missing header line `nlocations nclusters`"))?;
    let header = parse_row(line_no, header, 2)?;
    let n = to_usize(header[0], line_no)?;
    let p = to_usize(header[1], line_no)?;

    let mut distances = Vec::with_capacity(n);
    for i in 0..n {
        let (line_no, line) = rows
            .next()
            .ok_or_else(|| anyhow!("missing distance row {i} of {n}"))?;
        distances.push(parse_row(line_no, line, n)?);
    }

    let (line_no, line) = rows.next().ok_or_else(|| anyhow!("missing demand line"))?;
    let demands = parse_row(line_no, line, n)?;

    let (line_no, line) = rows
        .next()
        .ok_or_else(|| anyhow!("missing capacity line"))?;
    let capacities = parse_row(line_no, line, n)?;

    if let Some((line_no, _)) = rows.next() {
        bail!("unexpected data after capacity line at line {line_no}");
    }

    Ok(Instance::new(p, distances, demands, capacities)?)
}

/// Lines whose first token parses as an integer, with 1-based line numbers.
fn data_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content.lines().enumerate().filter_map(|(i, line)| {
        let first = line.split_whitespace().next()?;
        first.parse::<u64>().ok().map(|_| (i + 1, line))
    })
}

fn parse_row(line_no: usize, line: &str, expected: usize) -> Result<Vec<u64>> {
    let values = line
        .split_whitespace()
        .map(|tok| {
            tok.parse::<u64>()
                .with_context(|| format!("line {line_no}: `{tok}` is not a non-negative integer"))
        })
        .collect::<Result<Vec<_>>>()?;
    if values.len() != expected {
        bail!(
            "line {line_no}: expected {expected} values, found {}",
            values.len()
        );
    }
    Ok(values)
}

fn to_usize(value: u64, line_no: usize) -> Result<usize> {
    usize::try_from(value).with_context(|| format!("line {line_no}: {value} is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR: &str = "\
4 2
0 1 4 4
1 0 3 5
4 3 0 1
4 5 1 0
1 1 1 1
2 2 2 2
";

    #[test]
    fn test_parse_four_locations() {
        let inst = parse_instance(FOUR).unwrap();
        assert_eq!(inst.nlocations(), 4);
        assert_eq!(inst.nclusters(), 2);
        assert_eq!(inst.distance(1, 3), 5);
        assert_eq!(inst.demands(), &[1, 1, 1, 1]);
        assert_eq!(inst.capacities(), &[2, 2, 2, 2]);
    }

    #[test]
    fn test_skips_comment_and_blank_lines() {
        let text = "# generated\n\n2 1\n# distances\n0 3\n3 0\n\n% demands\n1 1\ncap:\n2 2\n";
        let inst = parse_instance(text).unwrap();
        assert_eq!(inst.distance(0, 1), 3);
        assert_eq!(inst.capacity(1), 2);
    }

    #[test]
    fn test_wrong_row_length_reports_line() {
        let text = "2 1\n0 3\n3\n1 1\n2 2\n";
        let err = parse_instance(text).unwrap_err().to_string();
        assert!(err.contains("line 3"), "{err}");
    }

    #[test]
    fn test_non_integer_token() {
        let text = "2 1\n0 3.5\n3 0\n1 1\n2 2\n";
        let err = format!("{:#}", parse_instance(text).unwrap_err());
        assert!(err.contains("3.5"), "{err}");
    }

    #[test]
    fn test_missing_capacity_line() {
        let err = parse_instance("1 1\n0\n1\n").unwrap_err();
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn test_trailing_data_is_rejected() {
        let text = format!("{FOUR}9 9 9 9\n");
        assert!(parse_instance(&text).is_err());
    }

    #[test]
    fn test_invalid_cluster_count() {
        let err = parse_instance("1 2\n0\n1\n1\n").unwrap_err();
        assert!(err.to_string().contains("clusters"));
    }
}
