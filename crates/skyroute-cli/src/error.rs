use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] skyroute_core::ValidationError),

    #[error(transparent)]
    Upstream(#[from] skyroute_core::UpstreamError),

    #[error(transparent)]
    Persistence(#[from] skyroute_core::PersistenceError),

    #[error(transparent)]
    Directory(#[from] skyroute_core::DirectoryError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<skyroute_core::CoreError> for CliError {
    fn from(error: skyroute_core::CoreError) -> Self {
        match error {
            skyroute_core::CoreError::Validation(error) => Self::Validation(error),
            skyroute_core::CoreError::Upstream(error) => Self::Upstream(error),
            skyroute_core::CoreError::Persistence(error) => Self::Persistence(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Upstream(_) => 3,
            Self::Persistence(_)
            | Self::Directory(_)
            | Self::Serialization(_)
            | Self::Io(_) => 10,
        }
    }
}
