use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable camera entry.
///
/// Updates never mutate a camera in place; they build a new value that keeps
/// the same `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub closed: bool,
}

impl Camera {
    /// Create a new active camera with a freshly generated id.
    pub fn new(title: Option<String>, description: Option<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title, description)
    }

    /// Create an active camera reusing an existing id (an edit of another camera).
    pub fn with_id(
        id: impl Into<String>,
        title: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title,
            description,
            closed: false,
        }
    }

    /// Copy of this camera marked as closed.
    pub fn closed(&self) -> Self {
        Self {
            closed: true,
            ..self.clone()
        }
    }

    /// Copy of this camera marked as active.
    pub fn activated(&self) -> Self {
        Self {
            closed: false,
            ..self.clone()
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_active(&self) -> bool {
        !self.closed
    }

    /// True when neither a title nor a description was given.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.title) && is_blank(&self.description)
    }

    /// Title shown in lists, falling back to the description when untitled.
    pub fn title_for_list(&self) -> Option<&str> {
        if !is_blank(&self.title) {
            self.title.as_deref()
        } else {
            self.description.as_deref()
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

// The closed flag is state, not identity: a camera toggled between active and
// closed still compares equal to its earlier value.
impl PartialEq for Camera {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.title == other.title && self.description == other.description
    }
}

impl Eq for Camera {}

impl std::fmt::Display for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Camera with title {}", self.title.as_deref().unwrap_or(""))
    }
}

/// Which cameras a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CamerasFilterType {
    #[default]
    All,
    Active,
    Closed,
}

impl CamerasFilterType {
    /// Parse a filter name ("all", "active", "closed"), case-insensitively.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Some(CamerasFilterType::All),
            "active" => Some(CamerasFilterType::Active),
            "closed" => Some(CamerasFilterType::Closed),
            _ => None,
        }
    }

    pub fn matches(&self, camera: &Camera) -> bool {
        match self {
            CamerasFilterType::All => true,
            CamerasFilterType::Active => camera.is_active(),
            CamerasFilterType::Closed => camera.is_closed(),
        }
    }

    /// Keep only the cameras this filter matches, preserving order.
    pub fn apply(&self, cameras: Vec<Camera>) -> Vec<Camera> {
        cameras.into_iter().filter(|c| self.matches(c)).collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            CamerasFilterType::All => "All cameras",
            CamerasFilterType::Active => "Active cameras",
            CamerasFilterType::Closed => "Closed cameras",
        }
    }
}
