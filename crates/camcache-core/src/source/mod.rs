//! Camera data sources.
//!
//! Both the durable local store and the remote service implement
//! `CamerasDataSource`, so the repository can treat them interchangeably:
//! - `LocalCamerasDataSource`: JSON file in the data directory
//! - `RemoteCamerasDataSource`: simulated service with network latency,
//!   optionally persisted to its own JSON file

pub mod local;
pub mod remote;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Camera;

pub use local::LocalCamerasDataSource;
pub use remote::RemoteCamerasDataSource;

/// Uniform operation set shared by every camera source.
///
/// Reads report absence with `DataSourceError::DataNotAvailable` (lists) or
/// `DataSourceError::NotFound` (single cameras).
#[async_trait]
pub trait CamerasDataSource: Send + Sync {
    async fn get_cameras(&self) -> Result<Vec<Camera>>;

    async fn get_camera(&self, camera_id: &str) -> Result<Camera>;

    async fn save_camera(&self, camera: &Camera) -> Result<()>;

    async fn close_camera(&self, camera: &Camera) -> Result<()>;

    /// Sources that cannot resolve ids on their own leave this as a no-op;
    /// the repository converts ids to cameras from its cache.
    async fn close_camera_by_id(&self, _camera_id: &str) -> Result<()> {
        Ok(())
    }

    async fn activate_camera(&self, camera: &Camera) -> Result<()>;

    async fn activate_camera_by_id(&self, _camera_id: &str) -> Result<()> {
        Ok(())
    }

    async fn clear_closed_cameras(&self) -> Result<()>;

    async fn refresh_cameras(&self) -> Result<()> {
        Ok(())
    }

    async fn delete_all_cameras(&self) -> Result<()>;

    async fn delete_camera(&self, camera_id: &str) -> Result<()>;

    /// Replace the whole contents with `cameras`, in order.
    ///
    /// Stores that can write everything at once should override this.
    async fn replace_all_cameras(&self, cameras: &[Camera]) -> Result<()> {
        self.delete_all_cameras().await?;
        for camera in cameras {
            self.save_camera(camera).await?;
        }
        Ok(())
    }
}
