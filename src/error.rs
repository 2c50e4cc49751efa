use thiserror::Error;

/// Raised when a zero-length vector is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("cannot normalize a zero-length vector ({x}, {y})")]
pub struct DegenerateVectorError {
    pub x: f64,
    pub y: f64,
}

/// A primitive failed validation at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid geometry for `{id}`: {reason}")]
pub struct InvalidGeometryError {
    pub id: String,
    pub reason: String,
}

impl InvalidGeometryError {
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Hard failures while building or laying out a scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error(transparent)]
    InvalidGeometry(#[from] InvalidGeometryError),
    #[error("unknown owner `{id}`")]
    UnknownOwner { id: String },
    #[error("duplicate primitive id `{id}`")]
    DuplicateId { id: String },
    #[error(transparent)]
    DegenerateVector(#[from] DegenerateVectorError),
}

impl SceneError {
    /// Id of the primitive or label owner that caused the failure, if any.
    pub fn offending_id(&self) -> Option<&str> {
        match self {
            SceneError::InvalidGeometry(err) => Some(&err.id),
            SceneError::UnknownOwner { id } | SceneError::DuplicateId { id } => Some(id),
            SceneError::DegenerateVector(_) => None,
        }
    }
}

/// The scene document could not be decoded.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid scene document: {0}")]
    Invalid(String),
}

/// Anything that can go wrong turning scene text into a validated [`crate::ir::Scene`].
#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl From<InvalidGeometryError> for SceneLoadError {
    fn from(err: InvalidGeometryError) -> Self {
        SceneLoadError::Scene(err.into())
    }
}
