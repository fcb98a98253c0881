//! Configuration file discovery, reading and writing.
//!
//! Files may be JSON5 (comments, trailing commas, unquoted keys) or plain
//! JSON; both go through the JSON5 parser. Writes always produce
//! pretty-printed JSON.
//!
//! # File Locations
//!
//! The first existing file wins:
//!
//! 1. `./relnote.json5`, then `./relnote.json`
//! 2. `<user config dir>/relnote/config.json5`, then `config.json`

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Project-local file names, in priority order.
const LOCAL_FILE_NAMES: &[&str] = &["relnote.json5", "relnote.json"];

/// Subdirectory of the platform config directory.
const USER_CONFIG_DIR: &str = "relnote";

/// File names inside the user config directory, in priority order.
const USER_FILE_NAMES: &[&str] = &["config.json5", "config.json"];

/// Finds the configuration file to load, if any.
///
/// # Examples
///
/// ```no_run
/// use relnote_config::persistence::find_config_file;
///
/// match find_config_file() {
///     Some(path) => println!("using {}", path.display()),
///     None => println!("no config file, using defaults"),
/// }
/// ```
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new("."), LOCAL_FILE_NAMES)
        .map(|p| p.strip_prefix(".").map(Path::to_path_buf).unwrap_or(p))
        .or_else(|| {
            let dir = user_config_dir().ok()?;
            find_in(&dir, USER_FILE_NAMES)
        })
}

/// Returns the first of `names` that exists under `dir`.
fn find_in(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names.iter().map(|name| dir.join(name)).find(|p| p.is_file())
}

/// Returns the project-local config file in `dir`, if one exists.
///
/// Uses the same names and priority as [`find_config_file`].
#[must_use]
pub fn find_local_config_file(dir: impl AsRef<Path>) -> Option<PathBuf> {
    find_in(dir.as_ref(), LOCAL_FILE_NAMES)
}

/// Returns the user configuration directory (e.g. `~/.config/relnote/`).
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDirectory`] if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(USER_CONFIG_DIR))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Reads and parses a JSON5 or JSON configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its content cannot be
/// parsed into `T`.
///
/// # Examples
///
/// ```no_run
/// use relnote_config::Config;
/// use relnote_config::persistence::read_config_file;
///
/// # fn main() -> relnote_config::Result<()> {
/// let config: Config = read_config_file("relnote.json5")?;
/// # Ok(())
/// # }
/// ```
pub fn read_config_file<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json5::from_str(&content)?)
}

/// Writes `config` as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized or the file
/// (or its parent directory) cannot be written.
pub fn write_config_file<T: serde::Serialize>(path: impl AsRef<Path>, config: &T) -> Result<()> {
    let path = path.as_ref();
    let write_err = |source| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut content = serde_json::to_string_pretty(config)?;
    content.push('\n');
    std::fs::write(path, content).map_err(write_err)
}
