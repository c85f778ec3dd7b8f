// src/infra/paths.rs — Path management
//
// All paths respect the TOWNHALL_HOME environment variable for isolation
// (tests point it at a temp dir). When unset, everything lives under
// ~/.townhall/.

use std::path::PathBuf;

fn townhall_home() -> Option<PathBuf> {
    std::env::var_os("TOWNHALL_HOME").map(PathBuf::from)
}

/// Root directory: $TOWNHALL_HOME or ~/.townhall
pub fn home_dir() -> PathBuf {
    if let Some(home) = townhall_home() {
        return home;
    }
    directories::BaseDirs::new()
        .expect("Could not determine home directory")
        .home_dir()
        .join(".townhall")
}

pub fn config_file() -> PathBuf {
    home_dir().join("config.toml")
}

pub fn credentials_file() -> PathBuf {
    home_dir().join("credentials.json")
}
