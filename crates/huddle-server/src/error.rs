//! Server error types.

use thiserror::Error;

/// Errors that can occur in the server runtime.
///
/// Both variants are fatal startup conditions. Once the server is serving,
/// per-session failures are handled locally by the session tasks and never
/// surface here.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error (invalid bind address). Fix the configuration
    /// and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport error (bind failure, listener teardown).
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ServerError::Config("bad address".to_owned());
        assert_eq!(err.to_string(), "configuration error: bad address");

        let err = ServerError::Transport("address in use".to_owned());
        assert_eq!(err.to_string(), "transport error: address in use");
    }
}
