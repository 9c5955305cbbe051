use thiserror::Error;

/// Error raised by every bets API call
///
/// Transport failures (timeout, connection) and protocol failures (non-JSON
/// body, failure status) share this one type so callers only match once.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request timed out ({secs} seconds)")]
    Timeout { secs: u64 },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Received not JSON response from API: {0}")]
    NotJson(String),

    #[error("API error: received unexpected json from API: {0}")]
    UnexpectedResponse(String),

    #[error("Deserialization failed: {0}")]
    Deserialize(String),

    #[error("Listing has more than {0} pages")]
    TooManyPages(usize),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid parameter: {0}")]
    Validation(String),

    #[error("Invalid timestamp {value:?}: expected format {format}")]
    InvalidTimestamp { value: String, format: &'static str },

    #[error("Invalid amount {0:?}")]
    InvalidAmount(String),
}

impl ApiError {
    /// Timeout or connection level failure
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Timeout { .. } | ApiError::Transport(_))
    }

    /// The server answered, but not with what the API promises
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            ApiError::NotJson(_)
                | ApiError::UnexpectedResponse(_)
                | ApiError::Deserialize(_)
                | ApiError::TooManyPages(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(ApiError::Timeout { secs: 5 }.is_transport());
        assert!(!ApiError::Timeout { secs: 5 }.is_protocol());
        assert!(ApiError::NotJson("<html>".into()).is_protocol());
        assert!(ApiError::UnexpectedResponse("{}".into()).is_protocol());
        assert!(!ApiError::Validation("x".into()).is_transport());
        assert!(!ApiError::Validation("x".into()).is_protocol());
    }

    #[test]
    fn test_timeout_message() {
        let err = ApiError::Timeout { secs: 5 };
        assert_eq!(err.to_string(), "Request timed out (5 seconds)");
    }
}
