use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest<'a> {
    pub file_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_session_id: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    #[serde(default)]
    pub session_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
