mod args;
mod logs;

pub use args::{Cli, CliCommand, LogsCliArgs};
pub use logs::handle_logs_command;
