use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface configuration
#[derive(Debug, Parser)]
#[command(author, version, about = "Line-anchored review annotations", long_about = None)]
pub struct Cli {
    /// Config file to use instead of the discovered `.margin/config.toml`
    #[arg(long, global = true, env = "MARGIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file, or a directory to put the log file in
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open files and annotate them in a line-oriented session
    Review {
        /// Files to open before the first command
        files: Vec<PathBuf>,

        /// Read commands from this file instead of stdin
        #[arg(short, long)]
        script: Option<PathBuf>,
    },
    /// List the annotation kinds
    Kinds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_review_with_script() {
        let cli = Cli::parse_from(["margin", "review", "a.txt", "b.txt", "--script", "s.margin"]);
        match cli.command {
            Command::Review { files, script } => {
                assert_eq!(files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
                assert_eq!(script, Some(PathBuf::from("s.margin")));
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["margin", "kinds", "--config", "c.toml", "--log-file", "x.log"]);
        assert!(matches!(cli.command, Command::Kinds));
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert_eq!(cli.log_file, Some(PathBuf::from("x.log")));
    }
}
