use std::path::{Path, PathBuf};

pub struct MarginPaths {
    pub config_path: Option<PathBuf>,
}

/// Find the `.margin` directory for `start_dir`: the nearest one among its
/// ancestors, else `<config_dir>/margin`.
pub fn discover(start_dir: &Path) -> MarginPaths {
    let dir = walk_ancestors(start_dir).or_else(system_config_dir);

    match dir {
        Some(d) => {
            tracing::info!("using margin directory: {}", d.display());
            paths_from_dir(&d)
        },
        None => {
            tracing::debug!("no .margin directory found");
            MarginPaths { config_path: None }
        },
    }
}

fn walk_ancestors(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(".margin"))
        .find(|candidate| candidate.is_dir())
}

fn system_config_dir() -> Option<PathBuf> {
    let dir = dirs::config_dir()?.join("margin");
    if dir.is_dir() {
        Some(dir)
    } else {
        None
    }
}

fn paths_from_dir(dir: &Path) -> MarginPaths {
    let config = dir.join("config.toml");
    MarginPaths {
        config_path: config.is_file().then_some(config),
    }
}
