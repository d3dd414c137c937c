// JSON error envelope for relay responses:
//
//   {"error": {"code", "message", "retryable", "request_id", "details"}}

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::request_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    NotFound,
    PayloadTooLarge,
    InternalError,
}

impl ErrorCode {
    /// Classify a status produced by an axum extractor rejection.
    pub fn for_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 | 415 | 422 => Self::ValidationFailed,
            404 => Self::NotFound,
            413 => Self::PayloadTooLarge,
            _ => Self::InternalError,
        }
    }

    pub const fn status(self) -> StatusCode {
        match self {
            Self::ValidationFailed => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Only server-side failures are worth retrying unchanged.
    pub const fn retryable(self) -> bool {
        matches!(self, Self::InternalError)
    }
}

#[derive(Debug, Clone)]
pub struct RelayError {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
    request_id: Option<String>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    error: EnvelopeBody<'a>,
}

#[derive(Serialize)]
struct EnvelopeBody<'a> {
    code: ErrorCode,
    message: &'a str,
    retryable: bool,
    request_id: Option<String>,
    details: Value,
}

impl RelayError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), details: None, request_id: None }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    fn from_rejection(status: StatusCode, body_text: String) -> Self {
        Self::new(ErrorCode::for_status(status), body_text)
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let request_id = self.request_id.or_else(request_id::current);
        let envelope = Envelope {
            error: EnvelopeBody {
                code: self.code,
                message: &self.message,
                retryable: self.code.retryable(),
                request_id: request_id.clone(),
                details: self.details.unwrap_or_else(|| Value::Object(Default::default())),
            },
        };

        let mut response = (self.code.status(), Json(envelope)).into_response();
        if let Some(id) = request_id {
            request_id::stamp(&mut response, &id);
        }
        response
    }
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for RelayError {
    fn from(rejection: QueryRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}
