//! Bounded retry for the topology fetch.
//!
//! A logical fetch makes one initial attempt plus up to `retry_limit`
//! retries. `503` responses wait a fixed delay before the next attempt;
//! timeouts retry immediately. Anything else ends the fetch.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::{
    decode::decode_body,
    outcome::Outcome,
    ClientOptions, NetEditError, Result,
};

/// Retry limit applied by [`ClientOptions::default`].
pub const DEFAULT_RETRY_LIMIT: u32 = 5;

/// Wait before retrying a `503` response under [`ClientOptions::default`].
pub const UNAVAILABLE_RETRY_DELAY: Duration = Duration::from_millis(2_000);

/// Why an attempt is being retried.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The service answered `503 Service Unavailable`.
    Unavailable,
    /// The request hit its deadline.
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("unavailable"),
            Self::Timeout => f.write_str("timeout"),
        }
    }
}

/// Retry bookkeeping for one logical fetch.
///
/// Values are never shared between fetches; [`RetryAttempt::record`]
/// consumes the current value and hands back the next one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct RetryAttempt {
    try_count: u32,
    retry_limit: u32,
    last_error: Option<ErrorKind>,
}

/// What to do after a retryable failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RetryDecision {
    /// Dispatch the request again.
    Retry(RetryAttempt),
    /// The limit is exhausted.
    GiveUp(RetryAttempt),
}

impl RetryAttempt {
    pub(crate) fn new(retry_limit: u32) -> Self {
        Self {
            try_count: 0,
            retry_limit,
            last_error: None,
        }
    }

    /// Attempts made so far, including the initial one.
    pub(crate) fn attempts(&self) -> u32 {
        self.try_count.saturating_add(1)
    }

    /// Records a retryable failure and decides whether to go again.
    pub(crate) fn record(self, kind: ErrorKind) -> RetryDecision {
        let next = Self {
            try_count: self.try_count.saturating_add(1),
            retry_limit: self.retry_limit,
            last_error: Some(kind),
        };
        if next.try_count <= next.retry_limit {
            RetryDecision::Retry(next)
        } else {
            // The attempt that just failed was the last one dispatched.
            RetryDecision::GiveUp(Self {
                try_count: self.try_count,
                ..next
            })
        }
    }

    fn notice(&self) -> RetryNotice {
        RetryNotice {
            attempt: self.try_count,
            retry_limit: self.retry_limit,
            kind: self.last_error.unwrap_or(ErrorKind::Unavailable),
        }
    }
}

/// Progress report handed to [`RetryObserver::before_retry`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryNotice {
    /// 1-based number of the retry about to be dispatched.
    pub attempt: u32,
    pub retry_limit: u32,
    /// Classification of the failure that triggered this retry.
    pub kind: ErrorKind,
}

/// Receives progress of a retried fetch.
pub trait RetryObserver {
    /// Called once per retry, before the request is dispatched again.
    fn before_retry(&mut self, _notice: RetryNotice) {}

    /// Called once when the retry limit is exhausted without success.
    fn after_all_retries(&mut self) {}
}

impl RetryObserver for () {}

/// Adapts a pair of closures into a [`RetryObserver`].
pub(crate) struct CallbackObserver<B, A> {
    pub before_retry: B,
    pub after_all_retries: Option<A>,
}

impl<B, A> RetryObserver for CallbackObserver<B, A>
where
    B: FnMut(RetryNotice),
    A: FnOnce(),
{
    fn before_retry(&mut self, notice: RetryNotice) {
        (self.before_retry)(notice);
    }

    fn after_all_retries(&mut self) {
        if let Some(callback) = self.after_all_retries.take() {
            callback();
        }
    }
}

/// Limit and delay applied by the retry loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct RetryPolicy {
    pub retry_limit: u32,
    pub unavailable_delay: Duration,
}

impl RetryPolicy {
    pub(crate) fn from_options(options: &ClientOptions) -> Self {
        Self {
            retry_limit: options.retry_limit,
            unavailable_delay: Duration::from_millis(options.unavailable_retry_delay_ms),
        }
    }
}

/// Runs `dispatch` until it succeeds, fails for good, or the limit is hit.
///
/// `dispatch` is invoked once per attempt and must already route
/// session-expiry statuses to the session's callback.
pub(crate) async fn run<T, F, Fut, O>(
    policy: RetryPolicy,
    observer: &mut O,
    mut dispatch: F,
) -> Result<T>
where
    T: DeserializeOwned,
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome>,
    O: RetryObserver + ?Sized,
{
    let mut attempt = RetryAttempt::new(policy.retry_limit);
    loop {
        let kind = match dispatch().await {
            Outcome::Success(response) => {
                let decoded = decode_body(&response.body);
                #[cfg(feature = "tracing")]
                if let Err(err) = &decoded {
                    tracing::error!("topology fetch failed: {err}");
                }
                return decoded;
            }
            Outcome::ServiceUnavailable { .. } => ErrorKind::Unavailable,
            Outcome::Timeout(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    attempt = attempt.attempts(),
                    "topology request timed out: {_err}"
                );
                ErrorKind::Timeout
            }
            Outcome::SessionExpired { status, .. } => {
                return Err(NetEditError::SessionExpired { status });
            }
            Outcome::Other(err) => {
                #[cfg(feature = "tracing")]
                tracing::error!("topology fetch failed: {err}");
                return Err(err);
            }
        };

        attempt = match attempt.record(kind) {
            RetryDecision::Retry(next) => next,
            RetryDecision::GiveUp(last) => {
                #[cfg(feature = "tracing")]
                tracing::error!(
                    attempts = last.attempts(),
                    "topology fetch gave up after {kind} failure"
                );
                observer.after_all_retries();
                return Err(NetEditError::RetriesExhausted {
                    attempts: last.attempts(),
                    last: kind,
                });
            }
        };

        let notice = attempt.notice();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt = notice.attempt,
            retry_limit = notice.retry_limit,
            "retrying topology fetch after {kind}"
        );
        observer.before_retry(notice);

        if kind == ErrorKind::Unavailable {
            sleep(policy.unavailable_delay).await;
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(delay: Duration) {
    tokio::time::sleep(delay).await;
}

/// Awaits a `setTimeout` promise from the JS host.
///
/// Resolves immediately when the host exposes no `setTimeout`.
#[cfg(target_arch = "wasm32")]
async fn sleep(delay: Duration) {
    use wasm_bindgen::{JsCast, JsValue};

    let millis = delay.as_millis().min(i32::MAX as u128) as i32;
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let global = js_sys::global();
        let scheduled = js_sys::Reflect::get(&global, &JsValue::from_str("setTimeout"))
            .ok()
            .and_then(|value| value.dyn_into::<js_sys::Function>().ok())
            .map(|set_timeout| {
                set_timeout
                    .call2(&global, &resolve, &JsValue::from(millis))
                    .is_ok()
            })
            .unwrap_or(false);
        if !scheduled {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, RetryAttempt, RetryDecision};

    #[test]
    fn limit_retries_follow_the_initial_attempt() {
        let mut attempt = RetryAttempt::new(5);
        for expected in 1..=5 {
            attempt = match attempt.record(ErrorKind::Unavailable) {
                RetryDecision::Retry(next) => next,
                RetryDecision::GiveUp(_) => panic!("gave up before retry {expected}"),
            };
            assert_eq!(attempt.try_count, expected);
        }

        match attempt.record(ErrorKind::Unavailable) {
            RetryDecision::GiveUp(last) => {
                assert_eq!(last.attempts(), 6);
                assert_eq!(last.last_error, Some(ErrorKind::Unavailable));
            }
            RetryDecision::Retry(_) => panic!("retried past the limit"),
        }
    }

    #[test]
    fn zero_limit_gives_up_on_first_failure() {
        let decision = RetryAttempt::new(0).record(ErrorKind::Timeout);
        match decision {
            RetryDecision::GiveUp(last) => {
                assert_eq!(last.attempts(), 1);
                assert_eq!(last.last_error, Some(ErrorKind::Timeout));
            }
            RetryDecision::Retry(_) => panic!("must not retry"),
        }
    }

    #[test]
    fn record_does_not_touch_the_previous_value() {
        let first = RetryAttempt::new(3);
        let _ = first.record(ErrorKind::Timeout);
        assert_eq!(first.try_count, 0);
        assert_eq!(first.last_error, None);
    }

    #[test]
    fn notice_carries_kind_and_one_based_attempt() {
        let RetryDecision::Retry(next) = RetryAttempt::new(5).record(ErrorKind::Timeout) else {
            panic!("must retry");
        };
        let notice = next.notice();
        assert_eq!(notice.attempt, 1);
        assert_eq!(notice.retry_limit, 5);
        assert_eq!(notice.kind, ErrorKind::Timeout);
    }
}
