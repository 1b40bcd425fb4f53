use crate::models::Camera;

/// Insertion-ordered map of cameras keyed by id.
///
/// Overwriting an existing id keeps its original position so listings stay
/// stable across edits.
#[derive(Debug, Clone, Default)]
pub struct CameraMap {
    entries: Vec<Camera>,
}

impl CameraMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cameras(cameras: impl IntoIterator<Item = Camera>) -> Self {
        let mut map = Self::new();
        for camera in cameras {
            map.insert(camera);
        }
        map
    }

    fn position(&self, camera_id: &str) -> Option<usize> {
        self.entries.iter().position(|c| c.id == camera_id)
    }

    pub fn get(&self, camera_id: &str) -> Option<&Camera> {
        self.entries.iter().find(|c| c.id == camera_id)
    }

    /// Insert or replace by id.
    pub fn insert(&mut self, camera: Camera) {
        match self.position(&camera.id) {
            Some(idx) => self.entries[idx] = camera,
            None => self.entries.push(camera),
        }
    }

    pub fn remove(&mut self, camera_id: &str) -> Option<Camera> {
        self.position(camera_id).map(|idx| self.entries.remove(idx))
    }

    /// Replace the stored camera with `f(camera)` if present.
    pub fn update(&mut self, camera_id: &str, f: impl FnOnce(&Camera) -> Camera) -> bool {
        match self.position(camera_id) {
            Some(idx) => {
                self.entries[idx] = f(&self.entries[idx]);
                true
            }
            None => false,
        }
    }

    /// Drop every closed camera, returning how many were removed.
    pub fn remove_closed(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(Camera::is_active);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> Vec<Camera> {
        self.entries.clone()
    }

    pub fn into_values(self) -> Vec<Camera> {
        self.entries
    }
}
