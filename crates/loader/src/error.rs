//! Failure classes for a single resource load.
//!
//! None of these propagate as faults. Every failure is recorded on the
//! session and the affected layer degrades (missing background, empty
//! selector, empty places) while the rest of the viewer keeps working.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The server answered with a non-success status.
    Http(u16),
    /// The request never produced a body (DNS, connection, CORS, abort).
    Network(String),
    /// The body arrived but is not the expected document shape.
    Parse(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Http(status) => write!(f, "HTTP status {status}"),
            LoadError::Network(reason) => write!(f, "network error: {reason}"),
            LoadError::Parse(reason) => write!(f, "parse error: {reason}"),
        }
    }
}

impl std::error::Error for LoadError {}
