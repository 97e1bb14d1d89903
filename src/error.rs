use crate::ErrorKind;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum NetEditError {
    /// The service answered `503 Service Unavailable`.
    #[error("service unavailable: {body}")]
    ServiceUnavailable { body: String },
    /// The request did not complete within its deadline.
    #[error("request timed out: {0}")]
    Timeout(reqwest::Error),
    /// The server no longer knows the session (`404` or `410`).
    ///
    /// When returned by a [`crate::SessionClient`] request, that client's
    /// expiry callback has already run. [`crate::SessionApi::destroy_session`]
    /// returns it without calling any callback.
    #[error("session expired (http {status})")]
    SessionExpired { status: u16 },
    /// The topology fetch used up its retry budget.
    #[error("giving up after {attempts} attempts, last failure: {last}")]
    RetriesExhausted {
        /// Total attempts made, including the initial one.
        attempts: u32,
        /// Classification of the final failed attempt.
        last: ErrorKind,
    },
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Response decoding or protocol-shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
    /// A session URL could not be derived from the creation response.
    #[error("invalid session url: {0}")]
    InvalidSessionUrl(String),
}

impl NetEditError {
    /// Returns the retry classification of this error, if it has one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::ServiceUnavailable { .. } => Some(ErrorKind::Unavailable),
            Self::Timeout(_) => Some(ErrorKind::Timeout),
            _ => None,
        }
    }

    /// Returns `true` when the error means the session is gone server-side.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}

#[cfg(test)]
mod tests {
    use crate::{ErrorKind, NetEditError};

    #[test]
    fn only_unavailable_and_timeout_carry_a_kind() {
        let unavailable = NetEditError::ServiceUnavailable {
            body: String::new(),
        };
        assert_eq!(unavailable.kind(), Some(ErrorKind::Unavailable));
        assert_eq!(NetEditError::SessionExpired { status: 410 }.kind(), None);
        assert_eq!(
            NetEditError::Http {
                status: 500,
                body: "boom".to_owned()
            }
            .kind(),
            None
        );
    }

    #[test]
    fn exhausted_message_names_last_kind() {
        let err = NetEditError::RetriesExhausted {
            attempts: 6,
            last: ErrorKind::Timeout,
        };
        assert_eq!(
            err.to_string(),
            "giving up after 6 attempts, last failure: timeout"
        );
    }
}
