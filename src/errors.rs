use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("Element not rendered yet: {0}")]
    NotRendered(String),

    #[error("Browser session closed: {0}")]
    SessionClosed(String),

    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Chrome error: {0}")]
    ChromeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Anyhow error: {0}")]
    AnyhowError(String),
}

pub type Result<T> = std::result::Result<T, BrowserError>;

impl From<anyhow::Error> for BrowserError {
    fn from(err: anyhow::Error) -> Self {
        BrowserError::AnyhowError(err.to_string())
    }
}

impl BrowserError {
    /// Whether a poll hitting this error should simply count as "not yet".
    ///
    /// Lookup failures caused by the page still changing under us are
    /// recoverable. Anything else means the session or the caller's own code
    /// is broken, and waiting longer will not help.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BrowserError::ElementNotFound(_)
                | BrowserError::StaleElement(_)
                | BrowserError::NotRendered(_)
        )
    }

    pub fn from_any_error<E: std::fmt::Display>(err: E) -> Self {
        BrowserError::ChromeError(err.to_string())
    }
}
