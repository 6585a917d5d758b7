pub mod error;
pub mod generator;
pub mod templates;
pub mod writer;

pub use error::*;
pub use generator::*;
pub use writer::*;
