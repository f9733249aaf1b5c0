use chrono::prelude::*;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::app_dirs::AppDirs;

/// One practice event: a completed word or an answered exercise.
#[derive(Debug, Clone)]
pub struct PracticeEntry {
    pub mode: String,
    pub level: String,
    pub item: String,
    pub outcome: String,
}

/// Append an entry to log.csv in the config directory. Skipped quietly when
/// no config directory can be resolved.
pub fn append_entry(entry: &PracticeEntry) -> io::Result<()> {
    match AppDirs::log_path() {
        Some(path) => append_entry_to(&path, entry),
        None => Ok(()),
    }
}

pub fn append_entry_to(path: &Path, entry: &PracticeEntry) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let needs_header = !path.exists();

    let mut log_file = OpenOptions::new()
        .write(true)
        .append(true)
        .create(true)
        .open(path)?;

    if needs_header {
        writeln!(log_file, "date,mode,level,item,outcome")?;
    }

    writeln!(
        log_file,
        "{},{},{},{},{}",
        Local::now().format("%c"),
        entry.mode,
        entry.level,
        entry.item,
        entry.outcome,
    )?;

    Ok(())
}
