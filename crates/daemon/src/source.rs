// Where the watch loop gets the actor's entities from.
//
// The loop only depends on `WatchSource`; `HttpWatchSource` is the
// production implementation backed by reqwest.

use std::time::Duration;

use roomwatch_common::entity::WatchedEntity;
use url::Url;

use crate::watch::Actor;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the entities currently owned by an actor.
///
/// Called once per poll cycle; implementations must be idempotent and
/// return `Send` futures so the loop can run on a multi-threaded runtime.
pub trait WatchSource: Send + Sync + 'static {
    fn fetch(
        &self,
        actor: &Actor,
    ) -> impl std::future::Future<Output = Result<Vec<WatchedEntity>, SourceError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("watch source request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("watch source returned HTTP {status}")]
    Status { status: u16 },
    #[error("watch source returned an invalid body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("watch source unavailable: {0}")]
    Unavailable(String),
}

/// `GET {endpoint}?owner={actor_id}` returning a JSON array of entities.
#[derive(Debug, Clone)]
pub struct HttpWatchSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpWatchSource {
    pub fn new(endpoint: Url) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl WatchSource for HttpWatchSource {
    async fn fetch(&self, actor: &Actor) -> Result<Vec<WatchedEntity>, SourceError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("owner", actor.id.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { status: status.as_u16() });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/entities")).unwrap()
    }

    async fn entities_for_owner(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
        let owner = query.get("owner").cloned().unwrap_or_default();
        Json(json!([{
            "id": format!("{owner}-1"),
            "status": "resolved",
            "assignee_name": "Bob",
            "category": "plumbing",
            "description": "Leaking tap",
            "updated_at": "2026-10-01T12:00:00Z"
        }]))
    }

    #[tokio::test]
    async fn fetch_passes_owner_and_decodes_entities() {
        let url = serve(Router::new().route("/entities", get(entities_for_owner))).await;
        let source = HttpWatchSource::new(url).unwrap();

        let entities = source.fetch(&Actor::new("u1", "reporter")).await.unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, "u1-1");
        assert_eq!(entities[0].assignee(), Some("Bob"));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let url = serve(Router::new().route(
            "/entities",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        ))
        .await;
        let source = HttpWatchSource::new(url).unwrap();

        let error = source.fetch(&Actor::new("u1", "reporter")).await.unwrap_err();
        assert!(matches!(error, SourceError::Status { status: 503 }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let url =
            serve(Router::new().route("/entities", get(|| async { Json(json!({"items": []})) })))
                .await;
        let source = HttpWatchSource::new(url).unwrap();

        let error = source.fetch(&Actor::new("u1", "reporter")).await.unwrap_err();
        assert!(matches!(error, SourceError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/entities")).unwrap();
        let source = HttpWatchSource::new(url).unwrap();
        let error = source.fetch(&Actor::new("u1", "reporter")).await.unwrap_err();
        assert!(matches!(error, SourceError::Transport(_)));
    }

    #[test]
    fn error_display() {
        assert_eq!(SourceError::Status { status: 502 }.to_string(), "watch source returned HTTP 502");
        assert_eq!(
            SourceError::Unavailable("offline".into()).to_string(),
            "watch source unavailable: offline"
        );
    }
}
