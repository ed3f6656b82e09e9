// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Resolve a configured level name. Falls back to INFO if missing or invalid.
pub fn parse_level(log_level: Option<&str>) -> Level {
    log_level
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

/// Initialize logging with optional level from config.
///
/// Logs go to stderr; stdout is reserved for decoded output.
pub fn init_logging(log_level: Option<&str>) {
    FmtSubscriber::builder()
        .with_target(false)
        .with_max_level(parse_level(log_level))
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(Some("debug")), Level::DEBUG);
        assert_eq!(parse_level(Some("TRACE")), Level::TRACE);
        assert_eq!(parse_level(Some("loud")), Level::INFO);
        assert_eq!(parse_level(None), Level::INFO);
    }
}
