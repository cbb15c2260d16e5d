use thiserror::Error;

/// The core's error type.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Login was rejected by the backend.
    #[error("Invalid login or password")]
    InvalidCredentials,

    /// A stored token was rejected during restore/refresh.
    #[error("Session expired")]
    SessionExpired,

    /// The permission menu could not be fetched. Any previously cached
    /// tree stays available.
    #[error("Menu fetch failed: {0}")]
    MenuFetchFailed(String),

    /// The backend rejected a locale switch; the active locale is unchanged.
    #[error("Locale change failed: {0}")]
    LocaleChangeFailed(String),

    /// The best-effort identity/menu resync after a locale change failed.
    /// Logged only; never rolls back the locale change.
    #[error("Secondary refresh failed: {0}")]
    SecondaryRefreshFailed(String),

    /// `set_locale` was called while a previous change was still in flight.
    /// The UI must disable the control instead of queueing.
    #[error("Locale change already in progress")]
    LocaleChangeInProgress,

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] sonic_rs::Error),

    /// A client-side storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `CoreError` as the error type.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns the HTTP status carried by an `Api` error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error means the current token is no longer valid.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::SessionExpired) || self.status() == Some(401)
    }
}
