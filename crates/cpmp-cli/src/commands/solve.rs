//! `cpmp solve`: branch-and-price on an instance file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tabwriter::TabWriter;
use tracing::info;

use cpmp_algo::{BranchAndPrice, BranchAndPriceConfig, BranchAndPriceSolution, KnapsackAlgorithm};
use cpmp_cli::{KnapsackChoice, OutputFormat};

/// Command-line overrides on top of the configuration file.
#[derive(Debug, Default)]
pub struct SolveOptions {
    pub config: Option<PathBuf>,
    pub lp_relaxation: bool,
    pub no_branching: bool,
    pub no_artificial: bool,
    pub node_limit: Option<usize>,
    pub time_limit: Option<f64>,
    pub knapsack: Option<KnapsackChoice>,
}

impl SolveOptions {
    pub fn resolve(&self) -> Result<BranchAndPriceConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                toml::from_str(&contents)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => BranchAndPriceConfig::default(),
        };
        if self.lp_relaxation {
            config.solve_integer = false;
        }
        if self.no_branching {
            config.semiassign_branching = false;
        }
        if self.no_artificial {
            config.artificial_columns = false;
        }
        if let Some(limit) = self.node_limit {
            config.node_limit = Some(limit);
        }
        if let Some(limit) = self.time_limit {
            config.time_limit_seconds = Some(limit);
        }
        if let Some(choice) = self.knapsack {
            config.knapsack = match choice {
                KnapsackChoice::Dp => KnapsackAlgorithm::DynamicProgramming,
                KnapsackChoice::Mip => KnapsackAlgorithm::Mip,
            };
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn handle(
    path: &Path,
    options: &SolveOptions,
    format: OutputFormat,
    out: Option<&Path>,
) -> Result<()> {
    let instance = super::load_instance(path)?;
    let config = options.resolve()?;
    info!(
        "Solving {} ({} locations, p = {})",
        path.display(),
        instance.nlocations(),
        instance.nclusters()
    );

    let solution = BranchAndPrice::new(&instance, config).solve()?;

    if let Some(out) = out {
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(out)
            .with_context(|| format!("creating {}", out.display()))?;
        serde_json::to_writer_pretty(file, &solution)
            .map_err(|err| anyhow::anyhow!("serializing solution to JSON: {err}"))?;
        info!("Wrote solution to {}", out.display());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&solution)?),
        OutputFormat::Plain => print_solution(&solution)?,
    }
    Ok(())
}

fn print_solution(solution: &BranchAndPriceSolution) -> Result<()> {
    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "Status\t{:?}", solution.status)?;
    match solution.objective {
        Some(obj) => writeln!(writer, "Objective\t{obj}")?,
        None => writeln!(writer, "Objective\t-")?,
    }
    writeln!(writer, "Dual bound\t{}", solution.dual_bound)?;
    if let Some(root) = solution.root_lp_bound {
        writeln!(writer, "Root LP bound\t{root:.6}")?;
    }
    if let Some(gap) = solution.gap() {
        writeln!(writer, "Gap\t{:.4}%", gap * 100.0)?;
    }
    let stats = &solution.stats;
    writeln!(writer, "Nodes\t{} (max depth {})", stats.nodes, stats.max_depth)?;
    writeln!(
        writer,
        "Columns\t{} ({} pricing rounds, {} Farkas)",
        stats.columns, stats.pricing_rounds, stats.farkas_rounds
    )?;
    writeln!(writer, "LP solves\t{}", stats.lp_solves)?;
    writeln!(writer, "Time\t{} ms", stats.solve_time_ms)?;
    writer.flush()?;
    print!("{}", String::from_utf8(writer.into_inner()?)?);

    if !solution.clusters.is_empty() {
        let mut writer = TabWriter::new(Vec::new()).padding(2);
        writeln!(writer, "\nMEDIAN\tCOST\tLOCATIONS")?;
        for cluster in &solution.clusters {
            let locations: Vec<String> =
                cluster.locations().iter().map(usize::to_string).collect();
            writeln!(
                writer,
                "{}\t{}\t{}",
                cluster.median(),
                cluster.cost(),
                locations.join(" ")
            )?;
        }
        writer.flush()?;
        print!("{}", String::from_utf8(writer.into_inner()?)?);
    } else if !solution.root_lp_solution.is_empty() {
        let mut writer = TabWriter::new(Vec::new()).padding(2);
        writeln!(writer, "\nCOLUMN\tVALUE\tLOCATIONS")?;
        for column in &solution.root_lp_solution {
            let locations: Vec<String> = column.locations.iter().map(usize::to_string).collect();
            writeln!(
                writer,
                "{}\t{:.6}\t{}",
                column.name,
                column.value,
                locations.join(" ")
            )?;
        }
        writer.flush()?;
        print!("{}", String::from_utf8(writer.into_inner()?)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bp.toml");
        fs::write(&path, "node_limit = 10\nartificial_columns = true\n").unwrap();

        let options = SolveOptions {
            config: Some(path),
            no_artificial: true,
            node_limit: Some(3),
            ..SolveOptions::default()
        };
        let config = options.resolve().unwrap();
        assert_eq!(config.node_limit, Some(3));
        assert!(!config.artificial_columns);
        assert!(config.solve_integer);
    }

    #[test]
    fn test_knapsack_flag_selects_solver() {
        let options = SolveOptions {
            knapsack: Some(KnapsackChoice::Dp),
            ..SolveOptions::default()
        };
        assert_eq!(
            options.resolve().unwrap().knapsack,
            KnapsackAlgorithm::DynamicProgramming
        );

        let options = SolveOptions {
            knapsack: Some(KnapsackChoice::Mip),
            ..SolveOptions::default()
        };
        assert_eq!(options.resolve().is_ok(), cfg!(feature = "solver-highs"));
    }

    #[test]
    fn test_rejects_invalid_time_limit() {
        let options = SolveOptions {
            time_limit: Some(-1.0),
            ..SolveOptions::default()
        };
        assert!(options.resolve().is_err());
    }
}
