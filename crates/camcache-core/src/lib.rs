//! camcache core library.
//!
//! A camera list kept in an in-memory cache in front of a durable local store
//! and a slower remote service:
//!
//! - `models`: `Camera` and listing filters
//! - `source`: the `CamerasDataSource` trait with local (JSON file) and
//!   simulated remote implementations
//! - `repository`: `CamerasRepository`, the cached facade over both sources
//! - `config`: data directory and remote latency settings

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod source;
pub mod utils;

pub use config::Config;
pub use error::DataSourceError;
pub use models::{Camera, CamerasFilterType};
pub use repository::{CacheStatus, CamerasRepository};
pub use source::{CamerasDataSource, LocalCamerasDataSource, RemoteCamerasDataSource};
