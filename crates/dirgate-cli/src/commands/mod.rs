//! CLI command implementations

pub mod change_password;
pub mod config_check;
pub mod reset_password;
pub mod resolve_dn;
pub mod verify;

use crate::output::{OutputFormat, Report};
use dirgate_auth::DirectoryClient;

/// Context passed to all commands
pub struct CommandContext {
    pub client: DirectoryClient,
    pub output_format: OutputFormat,
}

impl CommandContext {
    /// Check if output should be JSON
    pub fn is_json(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }

    /// Print a successful result
    pub fn report(&self, report: &Report) {
        if self.is_json() {
            println!("{}", report.to_json());
        } else {
            println!("{}", report.to_text());
        }
    }
}
