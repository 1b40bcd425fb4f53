//! Cached camera repository.
//!
//! `CamerasRepository` sits in front of a local and a remote data source and
//! keeps an in-memory copy of the camera list. Reads are answered from the
//! cache when it is valid, then from the local store, then from the remote
//! service. Writes go to remote, then local, then the cache.
//!
//! The cache is only replaced wholesale by a full list load. `refresh_cameras`
//! marks it dirty so the next list load goes straight to the remote service.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::CameraMap;
use crate::error::{DataSourceError, Result};
use crate::models::{Camera, CamerasFilterType};
use crate::source::CamerasDataSource;

#[derive(Debug, Default)]
struct CacheState {
    cameras: CameraMap,
    // Set by a full list load (or delete-all). Cameras cached one at a time
    // before that serve id lookups but never a listing.
    loaded: bool,
    dirty: bool,
}

impl CacheState {
    /// Cached copy, if the cache may be served as is.
    fn valid_cameras(&self) -> Option<Vec<Camera>> {
        (self.loaded && !self.dirty).then(|| self.cameras.values())
    }

    fn get(&self, camera_id: &str) -> Option<Camera> {
        self.cameras.get(camera_id).cloned()
    }
}

/// Point-in-time view of the repository cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
    pub initialized: bool,
    pub dirty: bool,
    pub len: usize,
}

impl CacheStatus {
    pub fn is_valid(&self) -> bool {
        self.initialized && !self.dirty
    }
}

pub struct CamerasRepository {
    remote: Arc<dyn CamerasDataSource>,
    local: Arc<dyn CamerasDataSource>,
    cache: Mutex<CacheState>,
}

impl CamerasRepository {
    pub fn new(remote: Arc<dyn CamerasDataSource>, local: Arc<dyn CamerasDataSource>) -> Self {
        Self {
            remote,
            local,
            cache: Mutex::new(CacheState::default()),
        }
    }

    /// Get cameras from the cache, the local store or the remote service,
    /// whichever can answer first.
    ///
    /// Returns `DataNotAvailable` when no source has data.
    pub async fn get_cameras(&self) -> Result<Vec<Camera>> {
        let dirty = {
            let state = self.cache.lock().await;
            if let Some(cameras) = state.valid_cameras() {
                debug!(count = cameras.len(), "Serving cameras from cache");
                return Ok(cameras);
            }
            state.dirty
        };

        if dirty {
            return self.get_cameras_from_remote().await;
        }

        match self.local.get_cameras().await {
            Ok(cameras) => {
                debug!(count = cameras.len(), "Loaded cameras from local store");
                Ok(self.refresh_cache(cameras).await)
            }
            Err(e) => {
                if !e.is_absence() {
                    warn!(error = %e, "Local store failed, falling back to remote");
                }
                self.get_cameras_from_remote().await
            }
        }
    }

    /// List all cameras; `force` bypasses the cache and local store.
    pub async fn load_cameras(&self, force: bool) -> Result<Vec<Camera>> {
        if force {
            self.refresh_cameras().await;
        }
        self.get_cameras().await
    }

    pub async fn get_filtered_cameras(
        &self,
        filter: CamerasFilterType,
        force: bool,
    ) -> Result<Vec<Camera>> {
        Ok(filter.apply(self.load_cameras(force).await?))
    }

    /// Get a single camera from the cache, the local store or the remote
    /// service. Hits from either source are added to the cache.
    pub async fn get_camera(&self, camera_id: &str) -> Result<Camera> {
        if let Some(camera) = self.cache.lock().await.get(camera_id) {
            debug!(camera_id, "Cache hit");
            return Ok(camera);
        }

        match self.local.get_camera(camera_id).await {
            Ok(camera) => return Ok(self.cache_camera(camera).await),
            Err(e) if e.is_absence() => {}
            Err(e) => warn!(camera_id, error = %e, "Local lookup failed, trying remote"),
        }

        match self.remote.get_camera(camera_id).await {
            Ok(camera) => Ok(self.cache_camera(camera).await),
            Err(e) if e.is_absence() => Err(DataSourceError::NotFound(camera_id.to_string())),
            Err(e) => Err(e),
        }
    }

    pub async fn save_camera(&self, camera: Camera) -> Result<()> {
        self.remote.save_camera(&camera).await?;
        self.local.save_camera(&camera).await?;
        self.cache.lock().await.cameras.insert(camera);
        Ok(())
    }

    pub async fn close_camera(&self, camera: &Camera) -> Result<()> {
        self.remote.close_camera(camera).await?;
        self.local.close_camera(camera).await?;
        self.cache.lock().await.cameras.insert(camera.closed());
        Ok(())
    }

    /// Close a camera known to the cache.
    pub async fn close_camera_by_id(&self, camera_id: &str) -> Result<()> {
        let camera = self.cached_camera(camera_id).await?;
        self.close_camera(&camera).await
    }

    pub async fn activate_camera(&self, camera: &Camera) -> Result<()> {
        self.remote.activate_camera(camera).await?;
        self.local.activate_camera(camera).await?;
        self.cache.lock().await.cameras.insert(camera.activated());
        Ok(())
    }

    /// Activate a camera known to the cache.
    pub async fn activate_camera_by_id(&self, camera_id: &str) -> Result<()> {
        let camera = self.cached_camera(camera_id).await?;
        self.activate_camera(&camera).await
    }

    pub async fn clear_closed_cameras(&self) -> Result<()> {
        self.remote.clear_closed_cameras().await?;
        self.local.clear_closed_cameras().await?;
        let removed = self.cache.lock().await.cameras.remove_closed();
        debug!(removed, "Cleared closed cameras from cache");
        Ok(())
    }

    /// Mark the cache dirty. The next list load fetches from remote.
    pub async fn refresh_cameras(&self) {
        self.cache.lock().await.dirty = true;
    }

    pub async fn delete_all_cameras(&self) -> Result<()> {
        self.remote.delete_all_cameras().await?;
        self.local.delete_all_cameras().await?;
        let mut state = self.cache.lock().await;
        state.cameras.clear();
        // Every source is empty now, which is a complete listing
        state.loaded = true;
        Ok(())
    }

    pub async fn delete_camera(&self, camera_id: &str) -> Result<()> {
        self.remote.delete_camera(camera_id).await?;
        self.local.delete_camera(camera_id).await?;
        self.cache.lock().await.cameras.remove(camera_id);
        Ok(())
    }

    pub async fn cache_status(&self) -> CacheStatus {
        let state = self.cache.lock().await;
        CacheStatus {
            initialized: state.loaded,
            dirty: state.dirty,
            len: state.cameras.len(),
        }
    }

    async fn get_cameras_from_remote(&self) -> Result<Vec<Camera>> {
        let cameras = self.remote.get_cameras().await?;
        info!(count = cameras.len(), "Reloaded cameras from remote");
        let cameras = self.refresh_cache(cameras).await;
        self.refresh_local_data_source(&cameras).await;
        Ok(cameras)
    }

    /// Replace the cache with `cameras` and mark it clean.
    async fn refresh_cache(&self, cameras: Vec<Camera>) -> Vec<Camera> {
        let mut state = self.cache.lock().await;
        state.cameras = CameraMap::from_cameras(cameras);
        state.loaded = true;
        state.dirty = false;
        let values = state.cameras.values();
        values
    }

    // The reload already succeeded, so a failed mirror write is only logged;
    // the next forced reload rewrites the local store again.
    async fn refresh_local_data_source(&self, cameras: &[Camera]) {
        if let Err(e) = self.local.replace_all_cameras(cameras).await {
            warn!(error = %e, "Failed to mirror reloaded cameras locally");
        }
    }

    async fn cache_camera(&self, camera: Camera) -> Camera {
        self.cache.lock().await.cameras.insert(camera.clone());
        camera
    }

    async fn cached_camera(&self, camera_id: &str) -> Result<Camera> {
        self.cache
            .lock()
            .await
            .get(camera_id)
            .ok_or_else(|| DataSourceError::NotFound(camera_id.to_string()))
    }
}
