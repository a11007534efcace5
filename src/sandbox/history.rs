use log::info;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Number of entries shown on the canvas
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// Append-only log of what happened to the equation.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: Vec<String>,
    window: usize,
}

impl Default for History {
    fn default() -> Self {
        History::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl History {
    pub fn new(window: usize) -> Self {
        History {
            entries: Vec::new(),
            window,
        }
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        info!("{}", entry);
        self.entries.push(entry);
    }

    /// The last `window` entries, oldest first
    pub fn recent(&self) -> &[String] {
        let start = self.entries.len().saturating_sub(self.window);
        &self.entries[start..]
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the full log, one entry per line.
    pub fn save_to_file(&self, path: &Path) -> io::Result<()> {
        let mut file = File::create(path)?;
        for entry in &self.entries {
            writeln!(file, "{}", entry)?;
        }
        info!("history of {} entries written to {}", self.entries.len(), path.display());
        Ok(())
    }
}
