//! Buffered append-only file sink

use crate::core::{LoggerError, Result, Sink, SinkOptions};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Appends records to a single file through a write buffer.
///
/// The buffer is flushed after `max_writes` writes, when `flush_interval`
/// has elapsed since the last flush, on [`Sink::close`], and on drop.
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    options: SinkOptions,
    writes_since_flush: usize,
    last_flush: Instant,
}

impl FileSink {
    /// Open (creating directories as needed) `path` for appending.
    pub fn open(path: impl Into<PathBuf>, options: SinkOptions) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    format!("cannot create '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening log file",
                    format!("cannot open '{}'", path.display()),
                    e,
                )
            })?;
        let writer = Some(BufWriter::with_capacity(options.buffer_size.max(1), file));

        Ok(Self {
            path,
            writer,
            options,
            writes_since_flush: 0,
            last_flush: Instant::now(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        self.writes_since_flush = 0;
        self.last_flush = Instant::now();
        Ok(())
    }

    fn flush_due(&self) -> bool {
        (self.options.max_writes > 0 && self.writes_since_flush >= self.options.max_writes)
            || self.last_flush.elapsed() >= self.options.flush_interval()
    }
}

impl Sink for FileSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::sink_closed("file"))?;

        writer.write_all(buf)?;
        self.writes_since_flush += 1;
        if self.flush_due() {
            self.flush()?;
        }
        Ok(buf.len())
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
