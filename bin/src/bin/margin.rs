use anyhow::Context;
use clap::Parser;
use margin::{paths, Config};
use margin_bin::{
    cli::{Cli, Command},
    commands,
};
use margin_log::LogConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_guard = match margin_log::init(LogConfig {
        log_file_path: cli.log_file.clone(),
    }) {
        Ok(guard) => {
            tracing::debug!("logging to {}", guard.log_file.display());
            Some(guard)
        },
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {e}");
            None
        },
    };

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let discovered = paths::discover(&cwd);
    let config =
        Config::load_with_overrides(cli.config.as_deref(), discovered.config_path.as_deref())?;

    match cli.command {
        Command::Review { files, script } => commands::review::run(config, &files, script.as_deref()),
        Command::Kinds => commands::kinds::run(),
    }
}
