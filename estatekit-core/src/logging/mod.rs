//! Logging built on the standard `log` crate
//!
//! Call [`init_logging`] once at startup, then use `log::info!` and friends
//! anywhere. Library code only ever talks to the `log` facade, so embedding
//! applications are free to install their own logger instead.
//!
//! ```rust,no_run
//! use estatekit_core::config::LoggingConfig;
//!
//! estatekit_core::logging::init_logging(&LoggingConfig::default()).unwrap();
//! log::info!("Loaded {} listings", 42);
//! ```

pub mod format;

pub use format::{LogEntry, LogFormat};

use crate::config::LoggingConfig;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install [`EstateLogger`] as the global logger. Later calls are no-ops.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = init_logging_internal(config);
    });
    result
}

fn init_logging_internal(config: &LoggingConfig) -> anyhow::Result<()> {
    let logger = EstateLogger::from_config(config)?;
    let max_level = logger.level;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}

/// Where formatted lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    Stderr,
}

/// `log::Log` implementation writing one formatted line per record
pub struct EstateLogger {
    level: log::LevelFilter,
    format: LogFormat,
    target: LogTarget,
}

impl EstateLogger {
    pub fn new(level: log::LevelFilter, format: LogFormat, target: LogTarget) -> Self {
        Self { level, format, target }
    }

    pub fn from_config(config: &LoggingConfig) -> anyhow::Result<Self> {
        let level = config
            .level
            .parse::<log::LevelFilter>()
            .map_err(|_| anyhow::anyhow!("Invalid log level: {}", config.level))?;
        let format = config.format.parse::<LogFormat>()?;
        let target = if config.stderr { LogTarget::Stderr } else { LogTarget::Stdout };
        Ok(Self::new(level, format, target))
    }
}

impl log::Log for EstateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format.format_entry(&LogEntry::from_log_record(record));
        // Broken pipes are not worth a panic
        let _ = match self.target {
            LogTarget::Stdout => writeln!(std::io::stdout().lock(), "{}", line),
            LogTarget::Stderr => writeln!(std::io::stderr().lock(), "{}", line),
        };
    }

    fn flush(&self) {
        let _ = match self.target {
            LogTarget::Stdout => std::io::stdout().flush(),
            LogTarget::Stderr => std::io::stderr().flush(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_logger_from_config() {
        let config = LoggingConfig { level: "warn".into(), format: "json".into(), stderr: false };
        let logger = EstateLogger::from_config(&config).unwrap();
        assert_eq!(logger.format, LogFormat::Json);
        assert_eq!(logger.target, LogTarget::Stdout);

        let warn = log::MetadataBuilder::new().level(log::Level::Warn).build();
        let debug = log::MetadataBuilder::new().level(log::Level::Debug).build();
        assert!(logger.enabled(&warn));
        assert!(!logger.enabled(&debug));
    }

    #[test]
    fn test_bad_level_is_rejected() {
        let config = LoggingConfig { level: "chatty".into(), ..Default::default() };
        assert!(EstateLogger::from_config(&config).is_err());
    }
}
