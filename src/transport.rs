use reqwest::header;
use serde::Serialize;

use crate::options::RequestSettings;

/// HTTP verbs used by the service API.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn method(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Status and body of a completed exchange.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: reqwest::StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// Issues one JSON request and reads the full response body.
///
/// Any status code is returned as `Ok`; classification happens in
/// [`crate::outcome::classify`].
pub(crate) async fn send<P>(
    http: &reqwest::Client,
    verb: Verb,
    url: &str,
    payload: Option<&P>,
    settings: &RequestSettings,
) -> std::result::Result<RawResponse, reqwest::Error>
where
    P: Serialize + ?Sized,
{
    // On WASM, reqwest uses AbortController for the timeout; `.timeout()`
    // is available on both targets.
    let mut request = http
        .request(verb.method(), url)
        .header(header::ACCEPT, "application/json")
        .timeout(settings.timeout);
    if let Some(payload) = payload {
        request = request
            .header(header::CONTENT_TYPE, "application/json")
            .json(payload);
    }

    let response = request.send().await?;
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = response.text().await?;

    Ok(RawResponse {
        status,
        location,
        body,
    })
}
