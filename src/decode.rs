use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::{
    transport::RawResponse,
    wire::CreateSessionResponse,
    Device, NetEditError, Result,
};

/// Decodes a JSON response body.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|err| {
        NetEditError::Decode(format!("invalid response JSON: {err}; body: {body}"))
    })
}

/// Extracts the new session's URL from a creation response.
///
/// The `Location` header wins over the body. Relative values are resolved
/// against `api_url`.
pub(crate) fn session_url_from_response(api_url: &str, response: &RawResponse) -> Result<String> {
    let candidate = match response.location.as_deref() {
        Some(location) if !location.trim().is_empty() => location.trim().to_owned(),
        _ => {
            let body = if response.body.trim().is_empty() {
                CreateSessionResponse::default()
            } else {
                decode_body::<CreateSessionResponse>(&response.body)?
            };
            body.session_url
                .or(body.url)
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| {
                    NetEditError::InvalidSessionUrl(format!(
                        "response carries neither a Location header nor a session url; body: {}",
                        response.body
                    ))
                })?
        }
    };

    if Url::parse(&candidate).is_ok() {
        return Ok(trim_session_url(&candidate));
    }

    let base = Url::parse(&format!("{}/", trim_session_url(api_url)))
        .map_err(|err| NetEditError::InvalidSessionUrl(format!("{api_url}: {err}")))?;
    base.join(&candidate)
        .map(|url| trim_session_url(url.as_str()))
        .map_err(|err| NetEditError::InvalidSessionUrl(format!("{candidate}: {err}")))
}

pub(crate) fn trim_session_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}

/// Re-applies the submitted `defaultGateway` onto the device returned by a
/// modification call. Returns `true` when the response was changed.
pub(crate) fn restore_default_gateway(submitted: &Device, returned: &mut Device) -> bool {
    match &submitted.default_gateway {
        Some(gateway) if returned.default_gateway.as_ref() != Some(gateway) => {
            returned.default_gateway = Some(gateway.clone());
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::{decode, transport::RawResponse, Device, NetEditError};

    fn created(location: Option<&str>, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::CREATED,
            location: location.map(str::to_owned),
            body: body.to_owned(),
        }
    }

    #[test]
    fn location_header_wins_over_body() {
        let url = decode::session_url_from_response(
            "http://svc/api",
            &created(
                Some("http://svc/api/sessions/7/"),
                r#"{"sessionUrl":"http://other"}"#,
            ),
        )
        .expect("must resolve");
        assert_eq!(url, "http://svc/api/sessions/7");
    }

    #[test]
    fn relative_location_resolves_against_api_url() {
        let url =
            decode::session_url_from_response("http://svc/api/", &created(Some("sessions/9"), ""))
                .expect("must resolve");
        assert_eq!(url, "http://svc/api/sessions/9");
    }

    #[test]
    fn body_url_is_used_without_location() {
        let url = decode::session_url_from_response(
            "http://svc/api",
            &created(None, r#"{"url":"http://svc/api/sessions/3"}"#),
        )
        .expect("must resolve");
        assert_eq!(url, "http://svc/api/sessions/3");
    }

    #[test]
    fn missing_session_url_is_an_error() {
        let err = decode::session_url_from_response("http://svc/api", &created(None, "{}"))
            .expect_err("must fail");
        assert!(matches!(err, NetEditError::InvalidSessionUrl(_)));
    }

    #[test]
    fn gateway_is_restored_only_when_submitted() {
        let submitted = Device::new("r1").with_default_gateway("10.0.0.1");
        let mut returned = Device::new("r1");
        assert!(decode::restore_default_gateway(&submitted, &mut returned));
        assert_eq!(returned.default_gateway.as_deref(), Some("10.0.0.1"));

        let mut untouched = Device::new("r1").with_default_gateway("10.9.9.9");
        assert!(!decode::restore_default_gateway(
            &Device::new("r1"),
            &mut untouched
        ));
        assert_eq!(untouched.default_gateway.as_deref(), Some("10.9.9.9"));
    }
}
