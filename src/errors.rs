use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProfileError>;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("No authenticated identity")]
    NoIdentity,
    #[error("Identity has no email attribute")]
    NoEmail,
    #[error("Expected exactly one profile row, got {0}")]
    RowCount(usize),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parsing error")]
    Parse,
    #[error("Config error: {0}")]
    Config(String),
}

impl ProfileError {
    /// Whether the reload was skipped before reaching the data service.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::NoIdentity | Self::NoEmail)
    }
}

impl From<serde_json::Error> for ProfileError {
    fn from(_: serde_json::Error) -> Self {
        Self::Parse
    }
}

impl From<url::ParseError> for ProfileError {
    fn from(e: url::ParseError) -> Self {
        Self::Config(e.to_string())
    }
}
