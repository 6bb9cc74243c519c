//! JSON Lines stream of every finding, errors included

use crate::error::Result;
use crate::models::Finding;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes one serialized finding per line as the sink receives them
pub struct JsonlWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    written: usize,
}

impl JsonlWriter {
    /// Creates the file, replacing any existing one
    pub fn create(path: &Path) -> Result<Self> {
        let writer = BufWriter::new(File::create(path)?);
        info!("Streaming findings as JSON lines to {}", path.display());
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write(&mut self, finding: &Finding) -> Result<()> {
        serde_json::to_writer(&mut self.writer, finding)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flushes the file and returns the number of lines written
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        info!("Exported {} findings to {}", self.written, self.path.display());
        Ok(self.written)
    }
}
