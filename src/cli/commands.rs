use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "feedshelf")]
#[command(about = "Recency-filtered RSS/Atom reader with export and a saved-entries shelf")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Commands {
    /// Interactive reader: refreshes on a timer and reads commands from stdin (default)
    Run,

    /// Fetch all feeds once, print the entries inside the retention window and exit
    Fetch,

    /// Print the current settings (creating the defaults if missing)
    Settings,
}
