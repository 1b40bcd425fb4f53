use thiserror::Error;

/// Errors returned by camera data sources and the repository.
///
/// `DataNotAvailable` and `NotFound` describe absence, not failure: a source
/// that has nothing to offer reports one of them so the caller can try the
/// next source.
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("No camera data available")]
    DataNotAvailable,

    #[error("Camera not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DataSourceError {
    /// True for `DataNotAvailable` and `NotFound`.
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            DataSourceError::DataNotAvailable | DataSourceError::NotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DataSourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_absence() {
        assert!(DataSourceError::DataNotAvailable.is_absence());
        assert!(DataSourceError::NotFound("abc".to_string()).is_absence());
        assert!(!DataSourceError::Storage(anyhow::anyhow!("disk full")).is_absence());
    }

    #[test]
    fn test_display() {
        let err = DataSourceError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "Camera not found: abc");
    }
}
