//! Logger set-up for interactive and headless runs.
//!
//! The interactive canvas owns the terminal, so it logs into a file only; headless runs
//! log to the terminal and, when asked, to a file as well.
use crate::sandbox::sandbox_error::SandboxError;
use chrono::Local;
use simplelog::*;
use std::fs::File;
use std::path::{Path, PathBuf};

pub fn parse_level(level: &str) -> Result<LevelFilter, SandboxError> {
    match level.to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(SandboxError::Config(format!(
            "log level must be off, error, warn, info, debug or trace, got '{}'",
            other
        ))),
    }
}

/// `drag_solve_<date>_<time>.log` in the working directory
pub fn default_log_file() -> PathBuf {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    PathBuf::from(format!("drag_solve_{}.log", date_and_time))
}

/// Installs the global logger. A logger that is already installed is kept.
pub fn init_logging(
    level: LevelFilter,
    interactive: bool,
    file: Option<&Path>,
) -> Result<(), SandboxError> {
    if level == LevelFilter::Off {
        return Ok(());
    }
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if !interactive {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    let file = match file {
        Some(path) => Some(path.to_path_buf()),
        None if interactive => Some(default_log_file()),
        None => None,
    };
    if let Some(path) = &file {
        loggers.push(WriteLogger::new(level, config, File::create(path)?));
    }

    match CombinedLogger::init(loggers) {
        Ok(()) => {
            log::info!(
                "logging at {} to {}",
                level,
                file.as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "terminal".to_string())
            );
        }
        Err(_) => log::debug!("logger already installed"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("trace").unwrap(), LevelFilter::Trace);
        assert!(matches!(parse_level("loud"), Err(SandboxError::Config(_))));
    }

    #[test]
    fn test_default_log_file_name() {
        let name = default_log_file().display().to_string();
        assert!(name.starts_with("drag_solve_"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn test_off_installs_nothing() {
        assert!(init_logging(LevelFilter::Off, true, None).is_ok());
    }
}
