use std::fmt;
use std::time::Duration;

use crate::{
    decode::{session_url_from_response, trim_session_url},
    options::{RequestOverrides, RequestSettings},
    outcome::{classify, Outcome},
    transport::{self, Verb},
    wire::CreateSessionRequest,
    ClientOptions, NetEditError, Result, SessionClient,
};

#[derive(Clone)]
/// Creates and destroys editing sessions on the service's API endpoint.
pub struct SessionApi {
    http: reqwest::Client,
    api_url: String,
    options: ClientOptions,
}

impl fmt::Debug for SessionApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionApi")
            .field("api_url", &self.api_url)
            .field("options", &self.options)
            .finish()
    }
}

impl SessionApi {
    /// Creates a session API handle for the service rooted at `api_url`.
    ///
    /// Example: `"https://netedit.example.com/api"`; sessions are created
    /// under `<api_url>/sessions`.
    pub fn new(api_url: impl AsRef<str>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: trim_session_url(api_url.as_ref()),
            options: ClientOptions::default(),
        }
    }

    /// Applies client options; they are also handed to opened sessions.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Reuses an existing `reqwest` client and its connection pool.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Starts a session editing the topology stored at `file_url`.
    ///
    /// `previous_session_id` asks the service to place the new session next
    /// to an earlier one. Uses `session_create_timeout_ms` as deadline.
    /// Returns the new session's URL.
    pub async fn create_session(
        &self,
        file_url: &str,
        previous_session_id: Option<&str>,
    ) -> Result<String> {
        let url = format!("{}/sessions", self.api_url);
        let payload = CreateSessionRequest {
            file_url,
            previous_session_id,
        };
        let settings = RequestSettings::resolve(
            &self.options,
            RequestOverrides::default(),
            RequestOverrides::timeout(Duration::from_millis(
                self.options.session_create_timeout_ms,
            )),
        );

        let response =
            transport::send(&self.http, Verb::Post, &url, Some(&payload), &settings).await;
        // Outside a session a 404 is an ordinary failure.
        let outcome = match classify(response) {
            Outcome::SessionExpired { status, body } => {
                Outcome::Other(NetEditError::Http { status, body })
            }
            outcome => outcome,
        };
        let result = outcome
            .into_result()
            .and_then(|response| session_url_from_response(&self.api_url, &response));

        match result {
            Ok(session_url) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%session_url, "created session");
                Ok(session_url)
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("create session failed: {err}");
                Err(err)
            }
        }
    }

    /// Creates a session and returns a client bound to it.
    pub async fn open<F>(
        &self,
        file_url: &str,
        previous_session_id: Option<&str>,
        on_expired: F,
    ) -> Result<SessionClient>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let session_url = self.create_session(file_url, previous_session_id).await?;
        Ok(SessionClient::new(session_url, on_expired)
            .with_options(self.options.clone())
            .with_http_client(self.http.clone()))
    }

    /// Deletes the session at `session_url`.
    ///
    /// A session the server no longer knows yields
    /// [`NetEditError::SessionExpired`]; no expiry callback is involved.
    pub async fn destroy_session(&self, session_url: &str) -> Result<()> {
        let settings = RequestSettings::resolve(
            &self.options,
            RequestOverrides::default(),
            RequestOverrides::default(),
        );
        let result = classify(
            transport::send::<()>(&self.http, Verb::Delete, session_url, None, &settings).await,
        )
        .into_result()
        .map(|_| ());

        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::warn!(session_url, "destroy session failed: {err}");
        }
        result
    }
}
