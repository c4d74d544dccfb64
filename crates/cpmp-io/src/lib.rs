//! # cpmp-io: CPMP instance files
//!
//! Reads and writes the whitespace-separated text format used for
//! Capacitated P-Median benchmark instances.
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let instance = cpmp_io::read_instance(Path::new("instances/p4.cpmp"))?;
//!     println!("{} locations, p = {}", instance.nlocations(), instance.nclusters());
//!     Ok(())
//! }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{parse_instance, read_instance};
pub use writer::{format_instance, write_instance};
