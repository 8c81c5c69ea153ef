pub mod commands;
pub mod shell;

pub use commands::{Cli, Commands};
pub use shell::{ExportFormat, SettingField, ShellCommand};
