// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration file support for ukhas-decoder.
//!
//! Config is loaded from the `[ukhas-decoder]` section of `ukhas-rs.toml`.
//! Default search order:
//! 1. Path specified via `--config` CLI argument
//! 2. `./ukhas-rs.toml`
//! 3. `~/.config/ukhas-rs/ukhas-rs.toml`
//! 4. `/etc/ukhas-rs/ukhas-rs.toml`

use chrono::format::{Item, StrftimeItems};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use ukhas_app::ConfigFile;
use ukhas_fsk::oversampling_ratio;

/// Top-level decoder configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Sample source
    pub input: InputConfig,
    /// Decoded packet output
    pub output: OutputConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
    /// Also print sync, length, CRC mismatch and oversize diagnostics
    pub verbose: bool,
}

/// Sample source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// File of s16le samples, or "-" for stdin
    pub path: String,
    /// Sample rate in Hz; a multiple of 2000 and at least 4000
    pub sample_rate: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: "-".to_string(),
            sample_rate: 64_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Timestamped lines with the raw payload
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Decoded packet output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// strftime-style timestamp prefix for text output
    pub timestamp_format: String,
    /// Timestamps in UTC instead of local time
    pub utc: bool,
    /// Print sample count and elapsed time when the input ends
    pub summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            utc: false,
            summary: true,
        }
    }
}

impl ConfigFile for DecoderConfig {
    fn section_key() -> &'static str {
        "ukhas-decoder"
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_log_level(self.general.log_level.as_deref())?;

        if self.input.path.trim().is_empty() {
            return Err("[input].path must not be empty (use \"-\" for stdin)".to_string());
        }
        oversampling_ratio(self.input.sample_rate)
            .map_err(|e| format!("[input].sample_rate: {}", e))?;

        validate_timestamp_format(&self.output.timestamp_format)?;
        Ok(())
    }

    /// Generate an example configuration wrapped under the `[ukhas-decoder]`
    /// section header, suitable for use in a combined `ukhas-rs.toml` file.
    pub fn example_combined_toml() -> String {
        #[derive(serde::Serialize)]
        struct Wrapper {
            #[serde(rename = "ukhas-decoder")]
            inner: DecoderConfig,
        }
        let example = DecoderConfig {
            general: GeneralConfig {
                log_level: Some("info".to_string()),
                verbose: false,
            },
            input: InputConfig::default(),
            output: OutputConfig::default(),
        };
        toml::to_string_pretty(&Wrapper { inner: example }).unwrap_or_default()
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn validate_log_level(level: Option<&str>) -> Result<(), String> {
    match level {
        Some(level) if !LOG_LEVELS.contains(&level) => Err(format!(
            "[general].log_level '{}' is invalid (expected one of: {})",
            level,
            LOG_LEVELS.join(", ")
        )),
        _ => Ok(()),
    }
}

fn validate_timestamp_format(format: &str) -> Result<(), String> {
    if format.is_empty() {
        return Err("[output].timestamp_format must not be empty".to_string());
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(format!(
            "[output].timestamp_format '{}' is not a valid strftime format",
            format
        ));
    }
    Ok(())
}
