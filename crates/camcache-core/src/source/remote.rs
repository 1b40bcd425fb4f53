//! Simulated remote camera service.
//!
//! Keeps its data in memory and delays every read by a fixed latency to
//! mimic a network round-trip. Writes apply immediately. A service opened
//! on a file keeps its state there, so separate processes see one remote.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::CamerasDataSource;
use crate::cache::{CameraFile, CameraMap};
use crate::error::{DataSourceError, Result};
use crate::models::Camera;

/// Default artificial latency applied to reads, in milliseconds.
pub const DEFAULT_SERVICE_LATENCY_MS: u64 = 5000;

/// The two sample cameras a fresh demo service starts with.
fn demo_cameras() -> Vec<Camera> {
    vec![
        Camera::new(
            Some("Build tower in Pisa".to_string()),
            Some("Ground looks good, no foundation work required.".to_string()),
        ),
        Camera::new(
            Some("Finish bridge in Tacoma".to_string()),
            Some("Found awesome girders at half the cost!".to_string()),
        ),
    ]
}

pub struct RemoteCamerasDataSource {
    cameras: Mutex<CameraMap>,
    // Written after every change when set
    file: Option<CameraFile>,
    latency: Duration,
}

impl RemoteCamerasDataSource {
    pub fn new(latency: Duration) -> Self {
        Self {
            cameras: Mutex::new(CameraMap::new()),
            file: None,
            latency,
        }
    }

    /// Service persisted at `path`.
    ///
    /// An existing file is loaded as is. Otherwise the file is created,
    /// holding the sample cameras when `seed_demo` is set, so their ids
    /// stay the same from one run to the next.
    pub fn open(path: PathBuf, latency: Duration, seed_demo: bool) -> anyhow::Result<Self> {
        let file = CameraFile::new(path);
        let cameras = match file.load()? {
            Some(cached) => CameraMap::from_cameras(cached.data),
            None => {
                let seeded = if seed_demo { demo_cameras() } else { Vec::new() };
                file.store(&seeded)?;
                debug!(path = %file.path().display(), count = seeded.len(), "Created remote store");
                CameraMap::from_cameras(seeded)
            }
        };

        Ok(Self {
            cameras: Mutex::new(cameras),
            file: Some(file),
            latency,
        })
    }

    /// Seed the service directly, bypassing latency.
    pub async fn add_cameras(&self, cameras: impl IntoIterator<Item = Camera>) -> Result<()> {
        let cameras: Vec<Camera> = cameras.into_iter().collect();
        self.mutate(move |map| {
            for camera in cameras {
                map.insert(camera);
            }
        })
        .await
    }

    /// Apply `f` to the service state and persist the result.
    async fn mutate<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut CameraMap) + Send,
    {
        let mut map = self.cameras.lock().await;
        f(&mut map);
        if let Some(ref file) = self.file {
            file.store(&map.values())?;
        }
        Ok(())
    }

    async fn simulate_network(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for RemoteCamerasDataSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SERVICE_LATENCY_MS))
    }
}

#[async_trait]
impl CamerasDataSource for RemoteCamerasDataSource {
    /// Never reports `DataNotAvailable`; an empty service returns an empty list.
    async fn get_cameras(&self) -> Result<Vec<Camera>> {
        self.simulate_network().await;
        let cameras = self.cameras.lock().await.values();
        debug!(count = cameras.len(), "Remote returned cameras");
        Ok(cameras)
    }

    async fn get_camera(&self, camera_id: &str) -> Result<Camera> {
        self.simulate_network().await;
        self.cameras
            .lock()
            .await
            .get(camera_id)
            .cloned()
            .ok_or_else(|| DataSourceError::NotFound(camera_id.to_string()))
    }

    async fn save_camera(&self, camera: &Camera) -> Result<()> {
        let camera = camera.clone();
        self.mutate(move |map| map.insert(camera)).await
    }

    async fn close_camera(&self, camera: &Camera) -> Result<()> {
        let camera = camera.closed();
        self.mutate(move |map| map.insert(camera)).await
    }

    async fn activate_camera(&self, camera: &Camera) -> Result<()> {
        let camera = camera.activated();
        self.mutate(move |map| map.insert(camera)).await
    }

    async fn clear_closed_cameras(&self) -> Result<()> {
        self.mutate(|map| {
            map.remove_closed();
        })
        .await
    }

    async fn delete_all_cameras(&self) -> Result<()> {
        self.mutate(CameraMap::clear).await
    }

    async fn delete_camera(&self, camera_id: &str) -> Result<()> {
        self.mutate(|map| {
            map.remove(camera_id);
        })
        .await
    }
}
