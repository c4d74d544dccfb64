//! # cpmp-core: Capacitated P-Median data model
//!
//! Shared types for the branch-and-price workspace:
//!
//! - [`Instance`]: validated distance matrix, demands, capacities and the
//!   cluster limit `p`
//! - [`Pattern`]: one cluster column (median + served locations + cost)
//! - [`Tolerances`]: numerical thresholds for LP values and pricing scores
//! - [`CpmpError`] / [`CpmpResult`]: unified error type
//!
//! ## Quick Start
//!
//! ```rust
//! use cpmp_core::{Instance, Pattern};
//!
//! let instance = Instance::new(
//!     1,
//!     vec![vec![0, 3], vec![3, 0]],
//!     vec![1, 1],
//!     vec![2, 2],
//! )
//! .unwrap();
//!
//! let cluster = Pattern::new(&instance, 0, vec![0, 1]);
//! assert_eq!(cluster.cost(), 3);
//! assert!(cluster.respects_capacity(&instance));
//! ```

pub mod error;
pub mod instance;
pub mod pattern;
pub mod tolerance;

pub use error::{CpmpError, CpmpResult};
pub use instance::Instance;
pub use pattern::Pattern;
pub use tolerance::Tolerances;
