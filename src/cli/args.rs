use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lexplain")]
#[command(about = "Plain-language backend for legal documents", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Print version information
    Version,
    /// Inspect persisted session audit logs without the server running
    Logs(LogsCliArgs),
}

#[derive(ClapArgs, Debug)]
pub struct LogsCliArgs {
    /// Session id to inspect (defaults to the most recent session)
    #[arg(short, long)]
    pub session: Option<String>,
    /// Maximum number of entries to show, newest last
    #[arg(short, long, default_value = "30")]
    pub limit: usize,
}
