use thiserror::Error;

use crate::model::GraphId;

/// Failure of a graph resource call. Messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with `success: false`.
    #[error("{0}")]
    Rejected(String),
    /// Non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("graph {0} not found")]
    NotFound(GraphId),
    #[error("network error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_) | ApiError::Http { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_pass_through() {
        assert_eq!(ApiError::Rejected("name taken".into()).to_string(), "name taken");
        let http = ApiError::Http {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(http.to_string(), "Internal Server Error");
        assert!(!http.is_not_found());
        assert!(ApiError::NotFound(GraphId::new("g1")).is_not_found());
    }
}
