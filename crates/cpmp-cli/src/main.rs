use clap::Parser;
use cpmp_cli::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::solve::SolveOptions;

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Solve {
            instance,
            config,
            lp_relaxation,
            no_branching,
            no_artificial,
            node_limit,
            time_limit,
            knapsack,
            format,
            out,
        } => {
            let options = SolveOptions {
                config,
                lp_relaxation,
                no_branching,
                no_artificial,
                node_limit,
                time_limit,
                knapsack,
            };
            commands::solve::handle(&instance, &options, format, out.as_deref())
        }
        Commands::Inspect { instance, format } => commands::inspect::handle(&instance, format),
        #[cfg(feature = "solver-clarabel")]
        Commands::Bound { instance, format } => commands::bound::handle(&instance, format),
        Commands::Completions { shell, out } => {
            commands::completions::handle(shell, out.as_deref())
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(err) = run(cli) {
        error!("{err:#}");
        std::process::exit(1);
    }
}
