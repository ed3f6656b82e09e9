// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shared config file name.
pub const CONFIG_FILE_NAME: &str = "ukhas-rs.toml";
const CONFIG_DIR_NAME: &str = "ukhas-rs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),

    #[error("Config file {0} has no [{1}] section")]
    MissingSection(PathBuf, &'static str),
}

/// Candidate config files in lookup order: working directory, user config
/// directory, then `/etc`.
pub fn config_search_paths() -> Vec<PathBuf> {
    let user_dir = dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME));
    std::iter::once(PathBuf::new())
        .chain(user_dir)
        .chain(std::iter::once(Path::new("/etc").join(CONFIG_DIR_NAME)))
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .collect()
}

/// Deserialize `[key]` from a TOML file, or `Ok(None)` when it is absent.
fn read_section<T: DeserializeOwned>(path: &Path, key: &str) -> Result<Option<T>, ConfigError> {
    let parse_err =
        |e: &dyn std::fmt::Display| ConfigError::ParseError(path.into(), e.to_string());

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(path.into(), e.to_string()))?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_err(&e))?;

    match table.remove(key) {
        // Going through the section's own value keeps `#[serde(default)]` in effect.
        Some(section) => section.try_into().map(Some).map_err(|e| parse_err(&e)),
        None => Ok(None),
    }
}

/// A config type stored as one section of `ukhas-rs.toml`.
pub trait ConfigFile: Sized + Default + DeserializeOwned {
    /// Section key, e.g. `"ukhas-decoder"`.
    fn section_key() -> &'static str;

    /// Load from an explicit file, which must contain the section.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        read_section(path, Self::section_key())?
            .ok_or_else(|| ConfigError::MissingSection(path.to_path_buf(), Self::section_key()))
    }

    /// Load from the first candidate that exists and carries the section.
    /// Falls back to `Default` with no path.
    fn load_from_candidates<I>(candidates: I) -> Result<(Self, Option<PathBuf>), ConfigError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for path in candidates.into_iter().filter(|p| p.is_file()) {
            if let Some(cfg) = read_section(&path, Self::section_key())? {
                return Ok((cfg, Some(path)));
            }
        }
        Ok((Self::default(), None))
    }

    fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        Self::load_from_candidates(config_search_paths())
    }

    /// Use `explicit` (from `--config`) when given, else search the defaults.
    fn resolve(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match explicit {
            Some(path) => Ok((Self::load_from_file(path)?, Some(path.to_path_buf()))),
            None => Self::load_from_default_paths(),
        }
    }
}
