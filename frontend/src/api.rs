//! Requests to the MailsFlow backend.
//!
//! Every call goes through `send`, which attaches the session's bearer header
//! and runs the session invalidation hook on the response status.

use crate::session::SessionContext;
use common::mapping::FieldMappingResult;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    Network(String),
    SessionExpired,
    /// The backend refused a campaign because of its field mapping.
    Rejected(FieldMappingResult),
    Status(u16, String),
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e) => write!(f, "network error: {e}"),
            ApiError::SessionExpired => write!(f, "your session has expired, please sign in again"),
            ApiError::Rejected(result) => write!(
                f,
                "the template uses fields missing from the file: {}",
                result.missing_fields.join(", ")
            ),
            ApiError::Status(status, text) => write!(f, "request failed ({status}): {text}"),
            ApiError::Decode(e) => write!(f, "unexpected response: {e}"),
        }
    }
}

fn authorize(builder: RequestBuilder, session: &SessionContext) -> RequestBuilder {
    match session.session.bearer_header() {
        Some(header) => builder.header("Authorization", &header),
        None => builder,
    }
}

async fn send<T: DeserializeOwned>(
    session: &SessionContext,
    request: Request,
) -> Result<T, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    read(session, response).await
}

async fn read<T: DeserializeOwned>(
    session: &SessionContext,
    response: Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if session.observe_status(status) {
        return Err(ApiError::SessionExpired);
    }
    if status == 422 {
        if let Ok(result) = response.json::<FieldMappingResult>().await {
            return Err(ApiError::Rejected(result));
        }
        return Err(ApiError::Status(status, String::new()));
    }
    if !response.ok() {
        let text = response.text().await.unwrap_or_default();
        return Err(ApiError::Status(status, text));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

pub async fn get_json<T: DeserializeOwned>(
    session: &SessionContext,
    url: &str,
) -> Result<T, ApiError> {
    let request = authorize(Request::get(url), session)
        .build()
        .map_err(|e| ApiError::Network(e.to_string()))?;
    send(session, request).await
}

pub async fn post_json<B: Serialize, T: DeserializeOwned>(
    session: &SessionContext,
    url: &str,
    body: &B,
) -> Result<T, ApiError> {
    let request = authorize(Request::post(url), session)
        .json(body)
        .map_err(|e| ApiError::Network(e.to_string()))?;
    send(session, request).await
}

/// Posts a multipart body (e.g. `web_sys::FormData`).
pub async fn post_form<T: DeserializeOwned>(
    session: &SessionContext,
    url: &str,
    form: impl Into<JsValue>,
) -> Result<T, ApiError> {
    let request = authorize(Request::post(url), session)
        .body(form)
        .map_err(|e| ApiError::Network(e.to_string()))?;
    send(session, request).await
}
