//! Output side effects: the per-step PNG encoder and the CSV stats writer.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{OrbitError, Result};
use crate::raster::Image;
use crate::stats::ImageStats;

pub const STATS_HEADER: &str = "step,min,max,mode,mean,median";

/// Encode `img` as a lossless 8-bit RGB PNG at `path`.
pub fn save_png(img: &Image, path: &Path) -> Result<()> {
    image::save_buffer_with_format(
        path,
        img.data(),
        img.width() as u32,
        img.height() as u32,
        image::ExtendedColorType::Rgb8,
        image::ImageFormat::Png,
    )?;
    debug!(path = %path.display(), "image saved");
    Ok(())
}

/// Format one stats row (no trailing newline).
pub fn format_stats_row(step: usize, stats: &ImageStats) -> String {
    format!(
        "{},{},{},{},{:.2},{:.2}",
        step, stats.min, stats.max, stats.mode, stats.mean, stats.median
    )
}

/// Appends stats rows to a CSV file, writing the header only when the file
/// does not exist yet.
///
/// Callers on different threads share one writer; the existence check, the
/// header and the row are written under a single lock so the header lands
/// exactly once.
#[derive(Debug)]
pub struct StatsWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl StatsWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, step: usize, stats: &ImageStats) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| OrbitError::Other(format!("stats writer lock poisoned: {e}")))?;

        let exists = self.path.exists();
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut buf = String::new();
        if !exists {
            buf.push_str(STATS_HEADER);
            buf.push('\n');
        }
        buf.push_str(&format_stats_row(step, stats));
        buf.push('\n');
        file.write_all(buf.as_bytes())?;
        Ok(())
    }
}

/// Remove `path` if present. A missing file is not an error.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
