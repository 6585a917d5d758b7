//! Run status reporting
//!
//! Callers and scripts match on these exact lines, so they never change.

use crate::error::MigrationError;

/// Printed to stdout after a committed run
pub const SUCCESS_MESSAGE: &str = "🛃 Data migration ran successfully!";

/// Printed to stderr before a failed run is rolled back
pub const FAILURE_MESSAGE: &str = "🛃 Data migration failed";

/// Receives the outcome of each run
pub trait Reporter: Send + Sync {
    fn success(&self);

    fn failure(&self, error: &MigrationError);
}

/// Writes the status lines to the process's standard streams
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn success(&self) {
        println!("{}", SUCCESS_MESSAGE);
    }

    fn failure(&self, _error: &MigrationError) {
        eprintln!("{}", FAILURE_MESSAGE);
    }
}
