//! Data models for the camera list.
//!
//! - `Camera`: an immutable camera entry with id, title, description and closed flag
//! - `CamerasFilterType`: All / Active / Closed listing filter

pub mod camera;

pub use camera::{Camera, CamerasFilterType};
