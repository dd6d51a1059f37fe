//! Output guard for the oracle run: label file plus human-readable log.

use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use tracing::{info, warn, Level};

use crate::corpus::records;

/// Entry appended to the log once every source line has been handled.
pub const COMPLETION_MARKER: &str = "finished creating single oracle file";

/// Holds the label and log handles for one run.
///
/// Everything written for a line is flushed with [`OracleSink::flush`] before
/// the next line starts, so an aborted run leaves a valid prefix behind. The
/// guard also flushes when dropped.
pub struct OracleSink {
    labels: BufWriter<File>,
    log: BufWriter<File>,
    label_path: PathBuf,
    log_path: PathBuf,
}

impl OracleSink {
    /// Truncate (or create) both files for a fresh run.
    pub fn create(label_path: &Path, log_path: &Path) -> Result<Self> {
        info!(labels = %label_path.display(), log = %log_path.display(), "creating new oracle and log files");
        Self::open(label_path, log_path, false)
    }

    /// Open both files for appending, as a resumed run does.
    pub fn append(label_path: &Path, log_path: &Path) -> Result<Self> {
        info!(labels = %label_path.display(), log = %log_path.display(), "appending to existing oracle and log files");
        Self::open(label_path, log_path, true)
    }

    fn open(label_path: &Path, log_path: &Path, append: bool) -> Result<Self> {
        let open = |path: &Path| -> Result<BufWriter<File>> {
            let mut options = OpenOptions::new();
            options.create(true);
            if append {
                options.append(true);
            } else {
                options.write(true).truncate(true);
            }
            let file = options
                .open(path)
                .with_context(|| format!("open {}", path.display()))?;
            Ok(BufWriter::new(file))
        };
        Ok(Self {
            labels: open(label_path)?,
            log: open(log_path)?,
            label_path: label_path.to_path_buf(),
            log_path: log_path.to_path_buf(),
        })
    }

    /// Append one `title_id\n<labels>\n\n` record.
    pub fn write_label(&mut self, title_id: &str, labels: &[u8]) -> Result<()> {
        records::write_record(&mut self.labels, title_id, &records::format_labels(labels))
            .with_context(|| format!("write {}", self.label_path.display()))
    }

    /// Log an informational entry to both the log file and tracing.
    pub fn info(&mut self, message: &str) -> Result<()> {
        info!("{message}");
        self.log_entry(Level::INFO, message)
    }

    /// Log a warning entry to both the log file and tracing.
    pub fn warn(&mut self, message: &str) -> Result<()> {
        warn!("{message}");
        self.log_entry(Level::WARN, message)
    }

    fn log_entry(&mut self, level: Level, message: &str) -> Result<()> {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        writeln!(self.log, "{stamp} {level} {message}")
            .with_context(|| format!("write {}", self.log_path.display()))
    }

    /// Push everything written so far to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.labels
            .flush()
            .with_context(|| format!("flush {}", self.label_path.display()))?;
        self.log
            .flush()
            .with_context(|| format!("flush {}", self.log_path.display()))
    }

    /// Append the completion marker and flush.
    pub fn finish(mut self) -> Result<()> {
        self.info(COMPLETION_MARKER)?;
        self.flush()
    }
}

impl Drop for OracleSink {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!(%err, "failed to flush oracle outputs");
        }
    }
}
