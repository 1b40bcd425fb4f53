//! Caching building blocks.
//!
//! - `CameraMap`: the insertion-ordered id -> camera map used by the
//!   repository cache and the in-memory remote service
//! - `CachedData`: timestamped envelope camera lists are persisted in
//! - `CameraFile`: a JSON file holding one such envelope

pub mod camera_file;
pub mod camera_map;

pub use camera_file::CameraFile;
pub use camera_map::CameraMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub saved_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            saved_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.saved_at).num_minutes()
    }

    /// Age rounded to the nearest whole unit: minutes, then hours, then days.
    pub fn age_display(&self) -> String {
        const HOUR: i64 = 60;
        const DAY: i64 = 24 * HOUR;

        match self.age_minutes() {
            // Negative ages come from clock skew
            m if m < 1 => "just now".to_string(),
            m if m < HOUR => format!("{}m ago", m),
            m if m < DAY => format!("{}h ago", (m + HOUR / 2) / HOUR),
            m => format!("{}d ago", (m + DAY / 2) / DAY),
        }
    }
}
