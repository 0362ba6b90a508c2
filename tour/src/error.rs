use std::fmt;

/// Fatal failures of the tour. Both end the process with a non-zero status.
#[derive(Debug)]
pub enum TourError {
    /// Window, surface, device or configuration setup failed.
    Initialization(anyhow::Error),
    /// A scene, mesh or texture file is missing or corrupt.
    AssetLoad(anyhow::Error),
}

impl TourError {
    pub fn exit_code(&self) -> i32 {
        -1
    }
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TourError::Initialization(error) => write!(f, "Initialization failed: {:#}", error),
            TourError::AssetLoad(error) => write!(f, "Asset loading failed: {:#}", error),
        }
    }
}

impl std::error::Error for TourError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TourError::Initialization(error) | TourError::AssetLoad(error) => Some(error.as_ref()),
        }
    }
}
