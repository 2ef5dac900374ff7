//! Privacy Guardian application layer: extraction dispatch, configuration
//! and the breach and policy collaborators used by the CLI.

pub mod breach;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod policy;
pub mod report;

pub use config::{load_config, AppConfig, ConfigError};
pub use dispatch::{extract_text, ExtractorMode, Scanner};
pub use report::ScanReport;
