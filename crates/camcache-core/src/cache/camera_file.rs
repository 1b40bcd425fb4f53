use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{CachedData, CameraMap};
use crate::models::Camera;

/// A camera list persisted as a `CachedData` JSON envelope.
#[derive(Debug, Clone)]
pub struct CameraFile {
    path: PathBuf,
}

impl CameraFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted snapshot, `None` when nothing was ever written.
    pub fn load(&self) -> Result<Option<CachedData<Vec<Camera>>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read camera file: {}", self.path.display()))?;

        let cached = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse camera file: {}", self.path.display()))?;

        Ok(Some(cached))
    }

    pub fn load_map(&self) -> Result<CameraMap> {
        Ok(self
            .load()?
            .map(|cached| CameraMap::from_cameras(cached.data))
            .unwrap_or_default())
    }

    /// Overwrite the file with `cameras`. Never reads the old contents.
    pub fn store(&self, cameras: &[Camera]) -> Result<()> {
        let contents = serde_json::to_string_pretty(&CachedData::new(cameras))?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write camera file: {}", self.path.display()))
    }
}
