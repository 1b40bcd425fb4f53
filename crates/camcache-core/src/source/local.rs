//! Durable camera store backed by a JSON file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::CamerasDataSource;
use crate::cache::{CachedData, CameraFile, CameraMap};
use crate::error::{DataSourceError, Result};
use crate::models::Camera;

/// File holding the persisted camera list inside the data directory
const CAMERAS_FILE: &str = "cameras.json";

pub struct LocalCamerasDataSource {
    data_dir: PathBuf,
    file: CameraFile,
    // Serializes read-modify-write cycles on the file
    write_lock: Mutex<()>,
}

impl LocalCamerasDataSource {
    pub fn new(data_dir: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create data directory: {}", data_dir.display())
        })?;
        Ok(Self {
            file: CameraFile::new(data_dir.join(CAMERAS_FILE)),
            data_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load the persisted snapshot, `None` when nothing was ever written.
    pub fn load(&self) -> anyhow::Result<Option<CachedData<Vec<Camera>>>> {
        self.file.load()
    }

    /// Apply `f` to the stored cameras and write the result back.
    async fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut CameraMap) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut map = self.file.load_map()?;
        f(&mut map);
        self.file.store(&map.into_values())?;
        Ok(())
    }

    /// Overwrite the file without reading it, so a corrupt store can be reset.
    async fn overwrite(&self, cameras: &[Camera]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.file.store(cameras)?;
        Ok(())
    }
}

#[async_trait]
impl CamerasDataSource for LocalCamerasDataSource {
    async fn get_cameras(&self) -> Result<Vec<Camera>> {
        let cameras = self.load()?.map(|cached| cached.data).unwrap_or_default();
        if cameras.is_empty() {
            // A store that was never written and one emptied out look the same
            debug!("Local camera store is empty");
            return Err(DataSourceError::DataNotAvailable);
        }
        Ok(cameras)
    }

    async fn get_camera(&self, camera_id: &str) -> Result<Camera> {
        self.file
            .load_map()?
            .get(camera_id)
            .cloned()
            .ok_or_else(|| DataSourceError::NotFound(camera_id.to_string()))
    }

    async fn save_camera(&self, camera: &Camera) -> Result<()> {
        let camera = camera.clone();
        self.modify(move |map| map.insert(camera)).await
    }

    async fn close_camera(&self, camera: &Camera) -> Result<()> {
        self.modify(|map| {
            map.update(&camera.id, Camera::closed);
        })
        .await
    }

    async fn activate_camera(&self, camera: &Camera) -> Result<()> {
        self.modify(|map| {
            map.update(&camera.id, Camera::activated);
        })
        .await
    }

    async fn clear_closed_cameras(&self) -> Result<()> {
        self.modify(|map| {
            map.remove_closed();
        })
        .await
    }

    async fn delete_all_cameras(&self) -> Result<()> {
        self.overwrite(&[]).await
    }

    async fn delete_camera(&self, camera_id: &str) -> Result<()> {
        self.modify(|map| {
            map.remove(camera_id);
        })
        .await
    }

    async fn replace_all_cameras(&self, cameras: &[Camera]) -> Result<()> {
        self.overwrite(cameras).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalCamerasDataSource) {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalCamerasDataSource::new(dir.path().join("data")).unwrap();
        (dir, source)
    }

    fn camera(title: &str) -> Camera {
        Camera::new(Some(title.to_string()), Some(format!("{} description", title)))
    }

    #[tokio::test]
    async fn test_empty_store_has_no_data() {
        let (_dir, source) = store();
        assert!(matches!(
            source.get_cameras().await,
            Err(DataSourceError::DataNotAvailable)
        ));
        assert!(matches!(
            source.get_camera("missing").await,
            Err(DataSourceError::NotFound(id)) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let (_dir, source) = store();
        let pisa = camera("Pisa");
        source.save_camera(&pisa).await.unwrap();

        assert_eq!(source.get_camera(&pisa.id).await.unwrap(), pisa);
        assert_eq!(source.get_cameras().await.unwrap(), vec![pisa]);
    }

    #[tokio::test]
    async fn test_save_overwrites_same_id() {
        let (_dir, source) = store();
        let pisa = camera("Pisa");
        source.save_camera(&pisa).await.unwrap();
        let edited = Camera::with_id(pisa.id.clone(), Some("Pisa 2".to_string()), None);
        source.save_camera(&edited).await.unwrap();

        let all = source.get_cameras().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title.as_deref(), Some("Pisa 2"));
    }

    #[tokio::test]
    async fn test_close_activate_and_clear_closed() {
        let (_dir, source) = store();
        let pisa = camera("Pisa");
        let tacoma = camera("Tacoma");
        source.save_camera(&pisa).await.unwrap();
        source.save_camera(&tacoma).await.unwrap();

        source.close_camera(&pisa).await.unwrap();
        assert!(source.get_camera(&pisa.id).await.unwrap().is_closed());

        source.activate_camera(&pisa).await.unwrap();
        assert!(source.get_camera(&pisa.id).await.unwrap().is_active());

        source.close_camera(&tacoma).await.unwrap();
        source.clear_closed_cameras().await.unwrap();
        assert_eq!(source.get_cameras().await.unwrap(), vec![pisa]);
    }

    #[tokio::test]
    async fn test_delete_one_and_all() {
        let (_dir, source) = store();
        let pisa = camera("Pisa");
        let tacoma = camera("Tacoma");
        source.save_camera(&pisa).await.unwrap();
        source.save_camera(&tacoma).await.unwrap();

        source.delete_camera(&pisa.id).await.unwrap();
        assert!(source.get_camera(&pisa.id).await.is_err());

        source.delete_all_cameras().await.unwrap();
        assert!(matches!(
            source.get_cameras().await,
            Err(DataSourceError::DataNotAvailable)
        ));
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let (dir, source) = store();
        let pisa = camera("Pisa");
        source.save_camera(&pisa).await.unwrap();
        drop(source);

        let reopened = LocalCamerasDataSource::new(dir.path().join("data")).unwrap();
        assert_eq!(reopened.get_cameras().await.unwrap(), vec![pisa]);
        assert_eq!(reopened.load().unwrap().unwrap().age_display(), "just now");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let (_dir, source) = store();
        std::fs::write(source.data_dir().join(CAMERAS_FILE), "not json").unwrap();
        let err = source.get_cameras().await.unwrap_err();
        assert!(!err.is_absence());
    }

    #[tokio::test]
    async fn test_delete_all_resets_corrupt_file() {
        let (_dir, source) = store();
        std::fs::write(source.data_dir().join(CAMERAS_FILE), "garbage").unwrap();

        source.delete_all_cameras().await.unwrap();

        assert!(matches!(
            source.get_cameras().await,
            Err(DataSourceError::DataNotAvailable)
        ));
        assert!(source.load().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_replace_all_writes_in_order() {
        let (_dir, source) = store();
        source.save_camera(&camera("Old")).await.unwrap();
        std::fs::write(source.data_dir().join(CAMERAS_FILE), "garbage").unwrap();

        let pisa = camera("Pisa");
        let tacoma = camera("Tacoma");
        source
            .replace_all_cameras(&[pisa.clone(), tacoma.clone()])
            .await
            .unwrap();

        assert_eq!(source.get_cameras().await.unwrap(), vec![pisa, tacoma]);
    }
}
