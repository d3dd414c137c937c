// Cross-origin access for browser heartbeats.
//
// Presence calls carry no credentials, so the layer never allows them,
// even for an explicit origin list.

use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::request_id;

const LOCAL_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

/// Which origins may call the relay, parsed from `ROOMWATCH_RELAY_CORS_ORIGINS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    AnyOrigin,
    Origins(Vec<HeaderValue>),
}

impl CorsPolicy {
    /// `"*"` is any origin, otherwise a comma-separated list. Unset (or a
    /// list with no usable entries) falls back to the local web dev server.
    pub fn from_setting(setting: Option<&str>) -> Self {
        match setting.map(str::trim) {
            Some("*") => Self::AnyOrigin,
            Some(list) => match origin_list(list.split(',')) {
                origins if origins.is_empty() => Self::local(),
                origins => Self::Origins(origins),
            },
            None => Self::local(),
        }
    }

    fn local() -> Self {
        Self::Origins(origin_list(LOCAL_ORIGINS.iter().copied()))
    }

    pub fn layer(self) -> CorsLayer {
        let allow_origin = match self {
            Self::AnyOrigin => AllowOrigin::any(),
            Self::Origins(origins) => AllowOrigin::list(origins),
        };
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(request_id::HEADER)])
            .expose_headers([HeaderName::from_static(request_id::HEADER)])
            .max_age(PREFLIGHT_MAX_AGE)
    }
}

fn origin_list<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<HeaderValue> {
    raw.map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::post, Router};
    use tower::ServiceExt;

    async fn preflight(policy: CorsPolicy, origin: &str) -> Option<String> {
        let app = Router::new().route("/v1/rooms/{room}/presence", post(|| async {}));
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/v1/rooms/lobby/presence")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.layer(policy.layer()).oneshot(request).await.unwrap();
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|value| value.to_str().unwrap().to_owned())
    }

    #[test]
    fn setting_parses_into_policy() {
        assert_eq!(CorsPolicy::from_setting(Some(" * ")), CorsPolicy::AnyOrigin);
        assert_eq!(
            CorsPolicy::from_setting(Some("https://a.dev, ,https://b.dev,")),
            CorsPolicy::Origins(vec![
                HeaderValue::from_static("https://a.dev"),
                HeaderValue::from_static("https://b.dev"),
            ])
        );
        assert_eq!(CorsPolicy::from_setting(Some(" , ")), CorsPolicy::local());
        assert_eq!(CorsPolicy::from_setting(None), CorsPolicy::local());
    }

    #[tokio::test]
    async fn local_dev_server_is_allowed_by_default() {
        let allowed = preflight(CorsPolicy::from_setting(None), "http://localhost:5173").await;
        assert_eq!(allowed.as_deref(), Some("http://localhost:5173"));
    }

    #[tokio::test]
    async fn unlisted_origin_gets_no_allow_header() {
        let policy = CorsPolicy::from_setting(Some("https://app.roomwatch.dev"));
        assert!(preflight(policy, "https://elsewhere.example.com").await.is_none());
    }

    #[tokio::test]
    async fn any_origin_answers_with_wildcard() {
        let allowed = preflight(CorsPolicy::AnyOrigin, "https://anywhere.example.com").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }
}
