//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod decode;
mod encode;
mod init;
mod inspect;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use init::InitCommand;
pub use inspect::InspectCommand;

use anyhow::Result;
use veilvault::VaultConfig;

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments and the loaded configuration.
    fn execute(&self, config: &VaultConfig) -> Result<()>;
}
