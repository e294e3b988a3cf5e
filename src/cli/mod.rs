//! CLI command handlers
//!
//! - Argument parsing structures
//! - Command routing
//! - Report and config command implementations

pub mod args;
pub mod report_command;
pub mod router;

pub use args::{Cli, Commands, ReportArgs};
pub use router::execute_command;
