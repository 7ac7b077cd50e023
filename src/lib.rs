pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod logging;
pub mod model;
pub mod platform;
pub mod progress;
pub mod scanner;
pub mod utils;
pub mod verdict;

pub use config::{CheckConfig, Settings};
pub use engine::CheckEngine;
pub use error::{CheckError, ConfigError, IdentityError, WalkError};
pub use model::{Identity, MetadataRecord, RecordSet};
pub use platform::{default_resolver, IdentityResolver};
pub use progress::{EvaluationReporter, LogReporter, SilentReporter};
pub use verdict::{State, Verdict};

pub const PLUGIN_NAME: &str = "check_path";

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Plugin name and version as shown in notifications.
pub fn branding() -> String {
    format!("{} {}", PLUGIN_NAME, version())
}
