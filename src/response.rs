//! HTTP response builders and the success envelope.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Response body type used throughout gangway.
pub type Body = Full<Bytes>;

/// Full response type used throughout gangway.
pub type HttpResponse = Response<Body>;

/// Envelope code for a successful call.
pub const SUCCESS_CODE: u32 = 1000;

/// Envelope message for a successful call.
pub const SUCCESS_MESSAGE: &str = "Success.";

/// Uniform wrapper around a handler's return value.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub code: u32,
    pub message: &'static str,
    pub data: T,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T, request_id: Option<String>) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: SUCCESS_MESSAGE,
            data,
            request_id,
        }
    }
}

/// Build a JSON response with the given status code and body.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> crate::Result<HttpResponse> {
    let json = serde_json::to_string(body)?;
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap())
}

/// Build a 200 OK JSON response.
pub fn ok<T: Serialize>(body: &T) -> crate::Result<HttpResponse> {
    json(StatusCode::OK, body)
}

/// Build a 200 OK response carrying `data` in a success envelope.
pub fn success<T: Serialize>(data: T, request_id: Option<String>) -> crate::Result<HttpResponse> {
    ok(&Envelope::success(data, request_id))
}

/// Build a 204 No Content response.
pub fn no_content() -> HttpResponse {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Full::new(Bytes::new()))
        .unwrap()
}
