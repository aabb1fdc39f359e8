use thiserror::Error;

/// Failure while reading the installed-application registry.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("platform registry unavailable: {0}")]
    Unavailable(String),

    #[error("failed to query installed applications: {0}")]
    Query(String),

    #[error("invalid catalog fixture: {0}")]
    Fixture(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while writing the settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// List edit refused in the current mode.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("cannot {0} while reordering")]
    Reordering(&'static str),
}
