use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cpmp", author, version, about = "Capacitated P-Median branch-and-price solver", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve an instance by branch-and-price
    Solve {
        /// Instance file
        #[arg(value_hint = ValueHint::FilePath)]
        instance: PathBuf,
        /// Solver configuration (TOML); command-line flags override it
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        /// Solve only the LP relaxation at the root
        #[arg(long)]
        lp_relaxation: bool,
        /// Disable semi-assignment branching
        #[arg(long)]
        no_branching: bool,
        /// Start the master without big-M artificial columns
        #[arg(long)]
        no_artificial: bool,
        /// Maximum number of processed nodes
        #[arg(long)]
        node_limit: Option<usize>,
        /// Wall-clock limit in seconds
        #[arg(long)]
        time_limit: Option<f64>,
        /// Pricing subproblem solver
        #[arg(long, value_enum)]
        knapsack: Option<KnapsackChoice>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
        /// Also write the solution as JSON to this file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Print instance statistics
    Inspect {
        /// Instance file
        #[arg(value_hint = ValueHint::FilePath)]
        instance: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Lower bound from the compact assignment LP
    #[cfg(feature = "solver-clarabel")]
    Bound {
        /// Instance file
        #[arg(value_hint = ValueHint::FilePath)]
        instance: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnapsackChoice {
    /// Dynamic programming over the capacity
    Dp,
    /// Binary program solved by HiGHS (feature `solver-highs`)
    Mip,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn test_solve_flags() {
        let cli = Cli::try_parse_from([
            "cpmp",
            "solve",
            "inst.txt",
            "--no-branching",
            "--node-limit",
            "5",
            "--format",
            "json",
            "--knapsack",
            "mip",
        ])
        .unwrap();
        match cli.command {
            Commands::Solve {
                instance,
                no_branching,
                node_limit,
                format,
                lp_relaxation,
                knapsack,
                ..
            } => {
                assert_eq!(knapsack, Some(KnapsackChoice::Mip));
                assert_eq!(instance, PathBuf::from("inst.txt"));
                assert!(no_branching);
                assert!(!lp_relaxation);
                assert_eq!(node_limit, Some(5));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
