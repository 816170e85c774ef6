//! Log line formats

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `2026-01-15 10:30:00.000 INFO  [estatekit_core::store] message`
    Human,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("Unknown log format: {}", other),
        }
    }
}

/// A `log::Record` captured with its timestamp
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: log::Level,
    pub target: String,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl LogEntry {
    pub fn from_log_record(record: &log::Record) -> Self {
        Self {
            timestamp: Utc::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            file: record.file().map(str::to_string),
            line: record.line(),
        }
    }
}

impl LogFormat {
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self {
            LogFormat::Human => format_human(entry),
            LogFormat::Json => format_json(entry),
        }
    }
}

fn format_human(entry: &LogEntry) -> String {
    let level = entry.level.as_str();
    format!(
        "{} {:5} [{}] {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        level,
        entry.target,
        entry.message
    )
}

fn format_json(entry: &LogEntry) -> String {
    let mut json = Map::new();
    json.insert("timestamp".to_string(), Value::String(entry.timestamp.to_rfc3339()));
    json.insert("level".to_string(), Value::String(entry.level.as_str().to_string()));
    json.insert("target".to_string(), Value::String(entry.target.clone()));
    json.insert("message".to_string(), Value::String(entry.message.clone()));
    if let (Some(file), Some(line)) = (&entry.file, entry.line) {
        json.insert("file".to_string(), Value::String(file.clone()));
        json.insert("line".to_string(), Value::from(line));
    }
    Value::Object(json).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level: log::Level::Info,
            target: "estatekit_core::store".to_string(),
            message: "Loaded 3 listings".to_string(),
            file: Some("src/store/file.rs".to_string()),
            line: Some(42),
        }
    }

    #[test]
    fn test_human_format() {
        let line = LogFormat::Human.format_entry(&entry());
        assert!(line.contains("INFO  [estatekit_core::store] Loaded 3 listings"));
    }

    #[test]
    fn test_json_format() {
        let line = LogFormat::Json.format_entry(&entry());
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["message"], "Loaded 3 listings");
        assert_eq!(parsed["line"], 42);
    }

    #[test]
    fn test_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
