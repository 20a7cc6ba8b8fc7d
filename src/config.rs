// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The configuration surface of the processing core: exactly the two
//! options the worker loop and its logging setup need. Everything else
//! (queue credentials, object store endpoints, secrets) belongs to the
//! out-of-scope adapters that embed this crate, not to the core.

use std::str::FromStr;

const LOGGING_LEVEL_ENV_VAR: &str = "CRASH_PROCESSOR_LOGGING_LEVEL";
const SLEEP_WHEN_EXHAUSTED_ENV_VAR: &str = "CRASH_PROCESSOR_SLEEP_WHEN_EXHAUSTED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LoggingLevel {
    pub fn as_log_level_filter(&self) -> log::LevelFilter {
        match self {
            LoggingLevel::Debug => log::LevelFilter::Debug,
            LoggingLevel::Info => log::LevelFilter::Info,
            LoggingLevel::Warning => log::LevelFilter::Warn,
            LoggingLevel::Error => log::LevelFilter::Error,
            LoggingLevel::Critical => log::LevelFilter::Error,
        }
    }
}

impl FromStr for LoggingLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LoggingLevel::Debug),
            "INFO" => Ok(LoggingLevel::Info),
            "WARNING" => Ok(LoggingLevel::Warning),
            "ERROR" => Ok(LoggingLevel::Error),
            "CRITICAL" => Ok(LoggingLevel::Critical),
            other => Err(format!(
                "invalid logging_level {:?}, expected one of DEBUG|INFO|WARNING|ERROR|CRITICAL",
                other
            )),
        }
    }
}

/// Application-level config: exactly the options the core reads.
#[derive(Debug, Clone)]
pub struct Config {
    pub logging_level: LoggingLevel,
    /// Seconds to sleep when the worklist is exhausted. `<= 0` means exit
    /// the worker loop on exhaustion instead of polling again.
    pub sleep_when_exhausted: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging_level: LoggingLevel::Info,
            sleep_when_exhausted: 2,
        }
    }
}

impl Config {
    /// Reads the two config options from their environment variables,
    /// falling back to defaults when unset or unparsable.
    pub fn from_env() -> Self {
        let logging_level = std::env::var(LOGGING_LEVEL_ENV_VAR)
            .ok()
            .and_then(|s| LoggingLevel::from_str(&s).ok())
            .unwrap_or(LoggingLevel::Info);

        let sleep_when_exhausted = std::env::var(SLEEP_WHEN_EXHAUSTED_ENV_VAR)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(2);

        Config {
            logging_level,
            sleep_when_exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_logging_level_from_str_accepts_all_variants() {
        assert_eq!(LoggingLevel::from_str("DEBUG").unwrap(), LoggingLevel::Debug);
        assert_eq!(LoggingLevel::from_str("info").unwrap(), LoggingLevel::Info);
        assert_eq!(LoggingLevel::from_str("Warning").unwrap(), LoggingLevel::Warning);
        assert_eq!(LoggingLevel::from_str("ERROR").unwrap(), LoggingLevel::Error);
        assert_eq!(LoggingLevel::from_str("critical").unwrap(), LoggingLevel::Critical);
    }

    #[test]
    fn test_logging_level_from_str_rejects_unknown() {
        assert!(LoggingLevel::from_str("VERBOSE").is_err());
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        unsafe { std::env::remove_var(LOGGING_LEVEL_ENV_VAR); }
        unsafe { std::env::remove_var(SLEEP_WHEN_EXHAUSTED_ENV_VAR); }
        let config = Config::from_env();
        assert_eq!(config.logging_level, LoggingLevel::Info);
        assert_eq!(config.sleep_when_exhausted, 2);
    }

    #[test]
    #[serial]
    fn test_config_from_env_reads_overrides() {
        unsafe { std::env::set_var(LOGGING_LEVEL_ENV_VAR, "DEBUG"); }
        unsafe { std::env::set_var(SLEEP_WHEN_EXHAUSTED_ENV_VAR, "10"); }
        let config = Config::from_env();
        unsafe { std::env::remove_var(LOGGING_LEVEL_ENV_VAR); }
        unsafe { std::env::remove_var(SLEEP_WHEN_EXHAUSTED_ENV_VAR); }

        assert_eq!(config.logging_level, LoggingLevel::Debug);
        assert_eq!(config.sleep_when_exhausted, 10);
    }

    #[test]
    #[serial]
    fn test_config_from_env_exit_on_exhaustion() {
        unsafe { std::env::set_var(SLEEP_WHEN_EXHAUSTED_ENV_VAR, "0"); }
        let config = Config::from_env();
        unsafe { std::env::remove_var(SLEEP_WHEN_EXHAUSTED_ENV_VAR); }
        assert_eq!(config.sleep_when_exhausted, 0);
    }
}
