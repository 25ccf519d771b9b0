use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

impl DeskError {
    /// Returns true for uniqueness clashes reported by the backend (HTTP 409).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns true when repeating the same request may succeed.
    ///
    /// Only transport failures and 5xx responses qualify; every other
    /// variant is a definitive answer from the backend or local code.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Maps a non-success HTTP status plus response body to an error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => Self::Validation(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Server { status, message },
        }
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;

impl From<reqwest::Error> for DeskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => Self::from_status(status.as_u16(), err.to_string()),
            None => Self::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DeskError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(DeskError::from_status(409, "dup"), DeskError::Conflict(_)));
        assert!(matches!(DeskError::from_status(404, "gone"), DeskError::NotFound(_)));
        assert!(matches!(DeskError::from_status(422, "bad"), DeskError::Validation(_)));
        assert!(matches!(DeskError::from_status(400, "bad"), DeskError::Validation(_)));
        assert!(matches!(DeskError::from_status(401, "who"), DeskError::Unauthorized(_)));
        assert!(matches!(DeskError::from_status(403, "no"), DeskError::Forbidden(_)));
        assert!(matches!(
            DeskError::from_status(503, "down"),
            DeskError::Server { status: 503, .. }
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(DeskError::Transport("reset".into()).is_retryable());
        assert!(DeskError::from_status(502, "bad gateway").is_retryable());
        assert!(!DeskError::from_status(418, "teapot").is_retryable());
        assert!(!DeskError::Conflict("name taken".into()).is_retryable());
        assert!(DeskError::Conflict("name taken".into()).is_conflict());
    }

    #[test]
    fn test_display() {
        let err = DeskError::Server {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "Server error (500): boom");
    }
}
