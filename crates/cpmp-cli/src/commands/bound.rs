use std::path::Path;

use anyhow::Result;

use cpmp_algo::compact_lp_bound;
use cpmp_cli::OutputFormat;

pub fn handle(path: &Path, format: OutputFormat) -> Result<()> {
    let instance = super::load_instance(path)?;
    let bound = compact_lp_bound(&instance)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&bound)?),
        OutputFormat::Plain => {
            println!("Compact LP bound: {:.6}", bound.objective);
            let opened: f64 = bound.openings.iter().sum();
            println!("Opened medians (fractional sum): {opened:.4}");
            println!("Solve time: {} ms", bound.solve_time_ms);
        }
    }
    Ok(())
}
