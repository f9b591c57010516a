use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persist::remove_if_exists;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

pub const STATS_FILE_NAME: &str = "img-stats.csv";

// ── Output layout ─────────────────────────────────────────────

/// Where a run writes its stats file and per-step images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
    #[serde(default = "default_stats_file")]
    pub stats_file: String,
    /// File name prefix for images; the step is appended as `{:03}.png`.
    #[serde(default = "default_image_prefix")]
    pub image_prefix: String,
}

fn default_stats_file() -> String {
    STATS_FILE_NAME.to_string()
}

fn default_image_prefix() -> String {
    "img".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl OutputConfig {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            stats_file: default_stats_file(),
            image_prefix: default_image_prefix(),
        }
    }

    pub fn stats_path(&self) -> PathBuf {
        self.dir.join(&self.stats_file)
    }

    pub fn image_path(&self, step: usize) -> PathBuf {
        self.dir.join(format!("{}{:03}.png", self.image_prefix, step))
    }

    /// Remove outputs left over from a previous run: the stats file and,
    /// when images are saved, one image per step.
    pub fn clean(&self, nb_steps: usize, save_images: bool) -> Result<()> {
        remove_if_exists(&self.stats_path())?;
        if save_images {
            for step in 0..nb_steps {
                remove_if_exists(&self.image_path(step))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_names_are_zero_padded() {
        let cfg = OutputConfig::in_dir("/tmp/out");
        assert_eq!(cfg.image_path(7), PathBuf::from("/tmp/out/img007.png"));
        assert_eq!(cfg.image_path(1234), PathBuf::from("/tmp/out/img1234.png"));
        assert_eq!(cfg.stats_path(), PathBuf::from("/tmp/out/img-stats.csv"));
    }

    #[test]
    fn clean_removes_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = OutputConfig::in_dir(dir.path());
        std::fs::write(cfg.stats_path(), "old").unwrap();
        std::fs::write(cfg.image_path(0), "old").unwrap();
        std::fs::write(cfg.image_path(5), "keep").unwrap();

        cfg.clean(2, true).unwrap();

        assert!(!cfg.stats_path().exists());
        assert!(!cfg.image_path(0).exists());
        assert!(cfg.image_path(5).exists());
    }

    #[test]
    fn clean_keeps_images_when_not_saving() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = OutputConfig::in_dir(dir.path());
        std::fs::write(cfg.image_path(0), "old").unwrap();
        cfg.clean(1, false).unwrap();
        assert!(cfg.image_path(0).exists());
    }

    #[test]
    fn deserialize_with_defaults() {
        let cfg: OutputConfig = serde_json::from_str(r#"{"dir":"out"}"#).unwrap();
        assert_eq!(cfg, OutputConfig::in_dir("out"));
    }
}
