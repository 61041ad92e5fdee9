pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, FixArgs, ScanArgs, TargetArgs};
pub use output::{OutputFormat, OutputFormatter};
