//! Command handlers for the seedbed CLI.

pub mod init;
pub mod status;
pub mod up;

// Re-export command types for convenience
pub use init::InitCommand;
pub use status::StatusCommand;
pub use up::UpCommand;
