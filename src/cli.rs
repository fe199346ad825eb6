use crate::mode::GameMode;
use crate::persistence::default_data_dir;
use clap::Parser;
use std::path::PathBuf;

pub const LOG_FILE_NAME: &str = "termo.log";

/// Daily word-guessing game in the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a newline-delimited word list (defaults to the built-in list)
    #[arg(short = 'i', long = "input")]
    pub wordbank_path: Option<PathBuf>,

    /// Game mode to start in; defaults to the mode of today's saved session
    #[arg(short, long, value_enum)]
    pub mode: Option<GameMode>,

    /// Directory for saved sessions, statistics and daily words
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing is read from or written to disk
    #[arg(long, conflicts_with = "data_dir")]
    pub memory: bool,

    /// Append log output to this file (defaults to termo.log in the data directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Data directory to use, or `None` when running in memory or when no
    /// platform directory is available.
    #[must_use]
    pub fn resolved_data_dir(&self) -> Option<PathBuf> {
        if self.memory {
            return None;
        }
        self.data_dir.clone().or_else(default_data_dir)
    }

    /// Log destination: `--log-file`, otherwise a file in the data directory.
    /// `None` means stderr.
    #[must_use]
    pub fn resolved_log_file(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| self.resolved_data_dir().map(|dir| dir.join(LOG_FILE_NAME)))
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}
