use thiserror::Error;

pub type ShelfResult<T> = Result<T, ShelfError>;

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("WalkDir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A package's `manifest.json` is missing, unreadable or malformed.
    /// Only that package is skipped.
    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ShelfError {
    /// True when the error means "nothing there" rather than a real fault.
    ///
    /// Missing override files and missing search roots are expected and
    /// are skipped without a warning.
    pub fn is_not_found(&self) -> bool {
        match self {
            ShelfError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            ShelfError::WalkDir(e) => e
                .io_error()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound),
            ShelfError::NotFound(_) => true,
            _ => false,
        }
    }
}
