//! Data migrations: the migration contract, name registry and runner.

pub mod definitions;
pub mod registry;
pub mod report;
pub mod runner;

pub use definitions::*;
pub use registry::*;
pub use report::*;
pub use runner::*;
