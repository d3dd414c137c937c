// Per-request correlation id.
//
// The request-context middleware picks the id (client-supplied `x-request-id`
// or a fresh UUID), runs the handler inside `scope`, and stamps the response.
// Error bodies read it back through `current`.

use std::future::Future;

use axum::{
    http::{HeaderMap, HeaderValue},
    response::Response,
};
use uuid::Uuid;

pub const HEADER: &str = "x-request-id";

tokio::task_local! {
    static CURRENT: String;
}

/// Client-supplied id when present and non-blank, otherwise a new UUID v4.
pub fn from_headers(headers: &HeaderMap) -> String {
    match headers.get(HEADER).and_then(|value| value.to_str().ok()).map(str::trim) {
        Some(id) if !id.is_empty() => id.to_owned(),
        _ => Uuid::new_v4().to_string(),
    }
}

pub async fn scope<F: Future>(id: String, future: F) -> F::Output {
    CURRENT.scope(id, future).await
}

/// Id of the request being handled, if called inside [`scope`].
pub fn current() -> Option<String> {
    CURRENT.try_with(String::clone).ok()
}

/// Set the `x-request-id` response header. Ids that are not valid header
/// values are left off.
pub fn stamp(response: &mut Response, id: &str) {
    if let Ok(value) = HeaderValue::from_str(id) {
        response.headers_mut().insert(HEADER, value);
    }
}
