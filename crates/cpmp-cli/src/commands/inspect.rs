//! Instance statistics.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tabwriter::TabWriter;

use cpmp_cli::OutputFormat;
use cpmp_core::Instance;

#[derive(Debug, Serialize)]
struct InstanceSummary {
    locations: usize,
    clusters: usize,
    total_demand: u64,
    /// Sum of the `p` largest capacities
    best_case_capacity: u64,
    min_capacity: u64,
    max_capacity: u64,
    max_distance: u64,
    worst_case_cost: u64,
}

impl InstanceSummary {
    fn new(instance: &Instance) -> Self {
        let caps = instance.capacities();
        Self {
            locations: instance.nlocations(),
            clusters: instance.nclusters(),
            total_demand: instance.total_demand(),
            best_case_capacity: instance.best_case_capacity(),
            min_capacity: caps.iter().copied().min().unwrap_or(0),
            max_capacity: caps.iter().copied().max().unwrap_or(0),
            max_distance: instance
                .distances()
                .iter()
                .flatten()
                .copied()
                .max()
                .unwrap_or(0),
            worst_case_cost: instance.worst_case_cost(),
        }
    }
}

pub fn handle(path: &Path, format: OutputFormat) -> Result<()> {
    let instance = super::load_instance(path)?;
    let summary = InstanceSummary::new(&instance);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => {
            let mut writer = TabWriter::new(Vec::new()).padding(2);
            writeln!(writer, "Locations\t{}", summary.locations)?;
            writeln!(writer, "Clusters (p)\t{}", summary.clusters)?;
            writeln!(writer, "Total demand\t{}", summary.total_demand)?;
            writeln!(writer, "Best-case capacity\t{}", summary.best_case_capacity)?;
            writeln!(
                writer,
                "Capacity range\t{}..{}",
                summary.min_capacity, summary.max_capacity
            )?;
            writeln!(writer, "Max distance\t{}", summary.max_distance)?;
            writeln!(writer, "Worst-case cost\t{}", summary.worst_case_cost)?;
            writer.flush()?;
            print!("{}", String::from_utf8(writer.into_inner()?)?);

            if summary.total_demand > summary.best_case_capacity {
                eprintln!(
                    "Total demand exceeds the {} largest capacities: the instance is infeasible.",
                    summary.clusters
                );
            }
        }
    }
    Ok(())
}
