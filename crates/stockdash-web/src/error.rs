use thiserror::Error;

/// Startup failures of the host, mapped to exit codes.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] stockdash_core::ConfigError),

    #[error(transparent)]
    Catalog(#[from] stockdash_core::CatalogError),

    #[error("http client: {0}")]
    Http(#[from] stockdash_core::HttpError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HostError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Catalog(_) => 3,
            Self::Http(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
