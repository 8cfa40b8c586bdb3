use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to load {path}: server answered {status}")]
    Status { path: String, status: u16 },
    #[error("failed to load {path}: {reason}")]
    Network { path: String, reason: String },
}

impl LoadError {
    pub fn path(&self) -> &str {
        match self {
            Self::Status { path, .. } | Self::Network { path, .. } => path,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("clipboard write rejected: {0}")]
pub struct ClipboardError(pub String);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("lesson catalog is empty")]
    Empty,
    #[error("lesson ids must run 1..=n without gaps: expected {expected}, found {found}")]
    Gap { expected: u32, found: u32 },
    #[error("lesson catalog is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}
