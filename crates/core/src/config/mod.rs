pub mod app_config;
pub mod sources;
pub mod validation;

pub use app_config::*;
pub use sources::*;
pub use validation::*;
