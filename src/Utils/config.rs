//! Settings file of the sandbox.
//!
//! ```toml
//! [sandbox]
//! expression = "2*x + 3 - 5"
//! variant = "functions"
//! variable = "x"
//! history_window = 5
//!
//! [logging]
//! level = "debug"
//! file = "session.log"
//! ```
//! Every key is optional; command line flags take precedence over the file.
use crate::sandbox::history::DEFAULT_HISTORY_WINDOW;
use crate::sandbox::sandbox_error::SandboxError;
use crate::sandbox::variant::Variant;
use log::warn;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use toml::{Table, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub expression: String,
    pub variant: Variant,
    pub variable: String,
    pub history_window: usize,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            expression: "2*x + 3 - 5".to_string(),
            variant: Variant::default(),
            variable: "x".to_string(),
            history_window: DEFAULT_HISTORY_WINDOW,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<AppConfig, SandboxError> {
        let source = std::fs::read_to_string(path)?;
        AppConfig::from_toml_str(&source)
    }

    pub fn from_toml_str(source: &str) -> Result<AppConfig, SandboxError> {
        let table: Table = source
            .parse()
            .map_err(|e: toml::de::Error| SandboxError::Config(e.to_string()))?;
        let mut config = AppConfig::default();

        for (section, value) in &table {
            let entries = value
                .as_table()
                .ok_or_else(|| SandboxError::Config(format!("[{}] must be a table", section)))?;
            match section.as_str() {
                "sandbox" => config.read_sandbox(entries)?,
                "logging" => config.read_logging(entries)?,
                other => warn!("unknown configuration section [{}] ignored", other),
            }
        }
        Ok(config)
    }

    fn read_sandbox(&mut self, entries: &Table) -> Result<(), SandboxError> {
        for (key, value) in entries {
            match key.as_str() {
                "expression" => self.expression = string_value("sandbox", key, value)?,
                "variable" => self.variable = string_value("sandbox", key, value)?,
                "variant" => {
                    let name = string_value("sandbox", key, value)?;
                    self.variant = Variant::from_str(&name).map_err(|_| {
                        SandboxError::Config(format!(
                            "sandbox.variant must be whole, split or functions, got '{}'",
                            name
                        ))
                    })?;
                }
                "history_window" => {
                    self.history_window = value
                        .as_integer()
                        .filter(|n| *n > 0)
                        .map(|n| n as usize)
                        .ok_or_else(|| {
                            SandboxError::Config(
                                "sandbox.history_window must be a positive integer".to_string(),
                            )
                        })?;
                }
                other => warn!("unknown key sandbox.{} ignored", other),
            }
        }
        Ok(())
    }

    fn read_logging(&mut self, entries: &Table) -> Result<(), SandboxError> {
        for (key, value) in entries {
            match key.as_str() {
                "level" => self.log_level = string_value("logging", key, value)?,
                "file" => self.log_file = Some(PathBuf::from(string_value("logging", key, value)?)),
                other => warn!("unknown key logging.{} ignored", other),
            }
        }
        Ok(())
    }
}

fn string_value(section: &str, key: &str, value: &Value) -> Result<String, SandboxError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SandboxError::Config(format!("{}.{} must be a string", section, key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_full_file() {
        let config = AppConfig::from_toml_str(
            r#"
            [sandbox]
            expression = "sin(x) - 1"
            variant = "functions"
            variable = "t"
            history_window = 8

            [logging]
            level = "debug"
            file = "session.log"
            "#,
        )
        .unwrap();
        assert_eq!(config.expression, "sin(x) - 1");
        assert_eq!(config.variant, Variant::Functions);
        assert_eq!(config.variable, "t");
        assert_eq!(config.history_window, 8);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_file, Some(PathBuf::from("session.log")));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AppConfig::from_toml_str("[sandbox]\nvariant = \"fancy\""),
            Err(SandboxError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[sandbox]\nhistory_window = 0"),
            Err(SandboxError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[sandbox]\nexpression = 3"),
            Err(SandboxError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("sandbox = ["),
            Err(SandboxError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config =
            AppConfig::from_toml_str("[sandbox]\ncolour = \"red\"\n[extra]\na = 1").unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
