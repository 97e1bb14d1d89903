use reqwest::StatusCode;

use crate::{transport::RawResponse, NetEditError, Result};

/// Classified result of a single request attempt.
#[derive(Debug)]
pub(crate) enum Outcome {
    Success(RawResponse),
    ServiceUnavailable { body: String },
    Timeout(reqwest::Error),
    SessionExpired { status: u16, body: String },
    Other(NetEditError),
}

/// Maps one transport result onto an [`Outcome`].
pub(crate) fn classify(result: std::result::Result<RawResponse, reqwest::Error>) -> Outcome {
    match result {
        Ok(response) if response.status.is_success() => Outcome::Success(response),
        Ok(response) => match response.status {
            StatusCode::SERVICE_UNAVAILABLE => Outcome::ServiceUnavailable {
                body: response.body,
            },
            StatusCode::NOT_FOUND | StatusCode::GONE => Outcome::SessionExpired {
                status: response.status.as_u16(),
                body: response.body,
            },
            status => Outcome::Other(NetEditError::Http {
                status: status.as_u16(),
                body: response.body,
            }),
        },
        Err(err) if err.is_timeout() => Outcome::Timeout(err),
        Err(err) => Outcome::Other(NetEditError::Transport(err)),
    }
}

impl Outcome {
    pub(crate) fn into_result(self) -> Result<RawResponse> {
        match self {
            Self::Success(response) => Ok(response),
            Self::ServiceUnavailable { body } => Err(NetEditError::ServiceUnavailable { body }),
            Self::Timeout(err) => Err(NetEditError::Timeout(err)),
            Self::SessionExpired { status, .. } => Err(NetEditError::SessionExpired { status }),
            Self::Other(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::{classify, Outcome};
    use crate::{transport::RawResponse, NetEditError};

    fn response(status: StatusCode, body: &str) -> RawResponse {
        RawResponse {
            status,
            location: None,
            body: body.to_owned(),
        }
    }

    #[test]
    fn success_statuses_are_success() {
        assert!(matches!(
            classify(Ok(response(StatusCode::OK, "{}"))),
            Outcome::Success(_)
        ));
        assert!(matches!(
            classify(Ok(response(StatusCode::NO_CONTENT, ""))),
            Outcome::Success(_)
        ));
    }

    #[test]
    fn service_unavailable_keeps_body() {
        match classify(Ok(response(StatusCode::SERVICE_UNAVAILABLE, "busy"))) {
            Outcome::ServiceUnavailable { body } => assert_eq!(body, "busy"),
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[test]
    fn not_found_and_gone_mean_session_expired() {
        for status in [StatusCode::NOT_FOUND, StatusCode::GONE] {
            match classify(Ok(response(status, "no such session"))) {
                Outcome::SessionExpired { status: code, body } => {
                    assert_eq!(code, status.as_u16());
                    assert_eq!(body, "no such session");
                }
                other => panic!("expected session expired, got {other:?}"),
            }
        }
    }

    #[test]
    fn other_statuses_are_generic_http_errors() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::GATEWAY_TIMEOUT,
        ] {
            match classify(Ok(response(status, "nope"))) {
                Outcome::Other(NetEditError::Http { status: code, body }) => {
                    assert_eq!(code, status.as_u16());
                    assert_eq!(body, "nope");
                }
                other => panic!("expected http error, got {other:?}"),
            }
        }
    }
}
