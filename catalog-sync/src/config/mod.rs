//! Configuration and dependency wiring.

mod dependencies;
mod settings;

pub use dependencies::{Dependencies, QueryServices};
pub use settings::{LogFormat, Settings};
