//! Project-level filesystem concerns: configuration, walking, history.

pub mod config;
pub mod folder_tree;
pub mod history;
pub mod project_scan;

pub use config::{find_config, Config, Project};
pub use history::History;
pub use project_scan::{ProjectScanner, ScanEvent};
