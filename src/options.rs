use std::time::Duration;

use crate::retry::{DEFAULT_RETRY_LIMIT, UNAVAILABLE_RETRY_DELAY};

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of topology fetch retries after the initial attempt.
    pub retry_limit: u32,
    /// Fixed wait before retrying a `503` response, in milliseconds.
    pub unavailable_retry_delay_ms: u64,
    /// Timeout for the session creation call, in milliseconds.
    pub session_create_timeout_ms: u64,
    /// Re-applies the submitted `defaultGateway` onto modified devices.
    ///
    /// Works around services that drop the field from their response.
    pub restore_default_gateway: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retry_limit: DEFAULT_RETRY_LIMIT,
            unavailable_retry_delay_ms: UNAVAILABLE_RETRY_DELAY.as_millis() as u64,
            session_create_timeout_ms: 10_000,
            restore_default_gateway: true,
        }
    }
}

/// Per-request settings that take precedence over client defaults.
///
/// Unset fields fall through to the next layer: operation override, then
/// client default, then [`ClientOptions`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct RequestOverrides {
    pub timeout: Option<Duration>,
    pub notify_session_expiry: Option<bool>,
}

impl RequestOverrides {
    pub(crate) fn timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }

    /// Fills unset fields from `fallback`; fields set on `self` win.
    pub(crate) fn or(self, fallback: RequestOverrides) -> Self {
        Self {
            timeout: self.timeout.or(fallback.timeout),
            notify_session_expiry: self.notify_session_expiry.or(fallback.notify_session_expiry),
        }
    }
}

/// Fully resolved settings for one request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct RequestSettings {
    pub timeout: Duration,
    pub notify_session_expiry: bool,
}

impl RequestSettings {
    pub(crate) fn resolve(
        options: &ClientOptions,
        client_default: RequestOverrides,
        operation: RequestOverrides,
    ) -> Self {
        let merged = operation.or(client_default);
        Self {
            timeout: merged
                .timeout
                .unwrap_or_else(|| Duration::from_millis(options.timeout_ms)),
            notify_session_expiry: merged.notify_session_expiry.unwrap_or(false),
        }
    }
}
