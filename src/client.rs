use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    decode::{decode_body, restore_default_gateway, trim_session_url},
    options::{RequestOverrides, RequestSettings},
    outcome::{classify, Outcome},
    retry::{self, CallbackObserver, RetryNotice, RetryObserver, RetryPolicy},
    transport::{self, Verb},
    ClientOptions, Device, Link, Network, Port, Result,
};

type ExpiryCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
/// HTTP client bound to one topology editing session.
///
/// Every request issued through this client reports `404 Not Found` and
/// `410 Gone` to the expiry callback given at construction.
pub struct SessionClient {
    http: reqwest::Client,
    session_url: String,
    on_expired: ExpiryCallback,
    options: ClientOptions,
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("session_url", &self.session_url)
            .field("on_expired", &"<callback>")
            .field("options", &self.options)
            .finish()
    }
}

impl SessionClient {
    /// Creates a client for the session at `session_url`.
    ///
    /// `on_expired` runs whenever the server reports the session as unknown.
    /// The URL is not validated; a malformed value surfaces as a transport
    /// error on first use.
    pub fn new<F>(session_url: impl AsRef<str>, on_expired: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            http: reqwest::Client::new(),
            session_url: trim_session_url(session_url.as_ref()),
            on_expired: Arc::new(on_expired),
            options: ClientOptions::default(),
        }
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Reuses an existing `reqwest` client and its connection pool.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn session_url(&self) -> &str {
        &self.session_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Fetches the session's topology, retrying `503` and timeouts.
    pub async fn get_network(&self) -> Result<Network> {
        self.fetch_network(&mut ()).await
    }

    /// Fetches the session's topology and reports retries to `observer`.
    ///
    /// Makes at most `retry_limit + 1` attempts. A `503` waits
    /// `unavailable_retry_delay_ms` before the next attempt; a timeout is
    /// retried at once. Session expiry and every other failure end the fetch
    /// without retrying.
    pub async fn fetch_network<O>(&self, observer: &mut O) -> Result<Network>
    where
        O: RetryObserver + ?Sized,
    {
        let url = self.endpoint("network");
        let url = url.as_str();
        retry::run(RetryPolicy::from_options(&self.options), observer, move || {
            self.dispatch::<()>(Verb::Get, url, None, RequestOverrides::default())
        })
        .await
    }

    /// Callback form of [`SessionClient::fetch_network`].
    ///
    /// `on_success` runs once with the topology. `before_retry` runs before
    /// each retry is dispatched. `after_all_retries` runs once if the retry
    /// limit is exhausted. At most one of `on_success` and
    /// `after_all_retries` runs. Failures are also returned as `Err`.
    pub async fn fetch_topology_with_retry<S, B, A>(
        &self,
        on_success: S,
        before_retry: B,
        after_all_retries: A,
    ) -> Result<()>
    where
        S: FnOnce(Network),
        B: FnMut(RetryNotice),
        A: FnOnce(),
    {
        let mut observer = CallbackObserver {
            before_retry,
            after_all_retries: Some(after_all_retries),
        };
        let network = self.fetch_network(&mut observer).await?;
        on_success(network);
        Ok(())
    }

    pub async fn create_device(&self, device: &Device) -> Result<Device> {
        let url = self.endpoint("devices");
        self.request("create device", Verb::Post, &url, Some(device))
            .await
    }

    pub async fn remove_device(&self, device_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("devices/{device_id}"));
        self.request_empty("remove device", Verb::Delete, &url)
            .await
    }

    /// Replaces the device identified by `device.id`.
    ///
    /// With [`ClientOptions::restore_default_gateway`] set, the submitted
    /// `default_gateway` is copied onto the returned device when the
    /// service's response disagrees with it.
    pub async fn modify_device(&self, device: &Device) -> Result<Device> {
        let url = self.endpoint(&format!("devices/{}", device.id));
        let mut updated: Device = self
            .request("modify device", Verb::Put, &url, Some(device))
            .await?;

        if self.options.restore_default_gateway && restore_default_gateway(device, &mut updated) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                device_id = %device.id,
                "restored defaultGateway missing from modify response"
            );
        }
        Ok(updated)
    }

    pub async fn list_ports(&self, device_id: &str) -> Result<Vec<Port>> {
        let url = self.endpoint(&format!("devices/{device_id}/ports"));
        self.request::<_, ()>("list ports", Verb::Get, &url, None)
            .await
    }

    pub async fn modify_port(&self, device_id: &str, port: &Port) -> Result<Port> {
        let url = self.endpoint(&format!("devices/{device_id}/ports/{}", port.id));
        self.request("modify port", Verb::Put, &url, Some(port))
            .await
    }

    pub async fn create_link(&self, link: &Link) -> Result<Link> {
        let url = self.endpoint("links");
        self.request("create link", Verb::Post, &url, Some(link))
            .await
    }

    pub async fn remove_link(&self, link_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("links/{link_id}"));
        self.request_empty("remove link", Verb::Delete, &url)
            .await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.session_url)
    }

    /// Settings every request of this session starts from.
    fn defaults(&self) -> RequestOverrides {
        RequestOverrides {
            notify_session_expiry: Some(true),
            ..RequestOverrides::default()
        }
    }

    /// Sends one request and routes session expiry to the callback.
    async fn dispatch<P>(
        &self,
        verb: Verb,
        url: &str,
        payload: Option<&P>,
        overrides: RequestOverrides,
    ) -> Outcome
    where
        P: Serialize + ?Sized,
    {
        let settings = RequestSettings::resolve(&self.options, self.defaults(), overrides);
        let outcome = classify(transport::send(&self.http, verb, url, payload, &settings).await);

        if let Outcome::SessionExpired { status, .. } = &outcome {
            if settings.notify_session_expiry {
                #[cfg(feature = "tracing")]
                tracing::info!(status, session_url = %self.session_url, "session expired");
                #[cfg(not(feature = "tracing"))]
                let _ = status;
                (self.on_expired)();
            }
        }
        outcome
    }

    async fn request<T, P>(
        &self,
        operation: &str,
        verb: Verb,
        url: &str,
        payload: Option<&P>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let result = self
            .dispatch(verb, url, payload, RequestOverrides::default())
            .await
            .into_result()
            .and_then(|response| decode_body(&response.body));
        log_failure(operation, result)
    }

    async fn request_empty(&self, operation: &str, verb: Verb, url: &str) -> Result<()> {
        let result = self
            .dispatch::<()>(verb, url, None, RequestOverrides::default())
            .await
            .into_result()
            .map(|_| ());
        log_failure(operation, result)
    }
}

fn log_failure<T>(_operation: &str, result: Result<T>) -> Result<T> {
    #[cfg(feature = "tracing")]
    if let Err(err) = &result {
        tracing::warn!("{_operation} failed: {err}");
    }
    result
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::SessionClient;

    #[test]
    fn session_url_trailing_slash_is_trimmed() {
        let client = SessionClient::new("http://svc/sessions/1/", || {});
        assert_eq!(client.session_url(), "http://svc/sessions/1");
        assert_eq!(client.endpoint("network"), "http://svc/sessions/1/network");
    }

    #[test]
    fn debug_hides_callback() {
        let client = SessionClient::new("http://svc/sessions/1", || {});
        let debug = format!("{client:?}");
        assert!(debug.contains("<callback>"));
        assert!(debug.contains("http://svc/sessions/1"));
    }

    #[test]
    fn clones_share_the_expiry_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let client = SessionClient::new("http://svc/sessions/1", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let clone = client.clone();
        (client.on_expired)();
        (clone.on_expired)();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
