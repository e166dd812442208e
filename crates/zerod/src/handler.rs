//! HTTP front end: every inbound request becomes a fetch event

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use http::header::{CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use http::HeaderName;
use serde_json::{json, Value};
use tracing::warn;
use url::Url;
use zerostore::{MemoryCacheStore, Request, RequestMode, Response};
use zeroworker::ServiceWorker;

/// Path of the statistics endpoint
pub const STATS_PATH: &str = "/__zero/stats";

const SEC_FETCH_MODE: HeaderName = HeaderName::from_static("sec-fetch-mode");

/// Headers that describe one connection and must not be forwarded
const HOP_BY_HOP: [HeaderName; 4] = [CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING];

/// State shared by the handlers
pub struct AppState {
    pub worker: ServiceWorker,
    pub store: Arc<MemoryCacheStore>,
    pub origin: Url,
}

/// Build the axum router
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route(STATS_PATH, get(handle_stats))
        .fallback(handle_intercept)
        .with_state(state)
}

async fn handle_stats(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "state": state.worker.state(),
        "namespace": state.worker.config().namespace().to_string(),
        "origin": state.origin.as_str(),
        "worker": state.worker.stats().snapshot(),
        "store": state.store.stats().snapshot(),
    }))
}

async fn handle_intercept(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let request = match intercepted_request(&state.origin, method, &uri, headers, body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected request for {}: {}", uri, e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    into_http_response(state.worker.fetch(&request).await)
}

/// Map an inbound request onto the origin
pub fn intercepted_request(
    origin: &Url,
    method: Method,
    uri: &Uri,
    mut headers: HeaderMap,
    body: Bytes,
) -> zerostore::Result<Request> {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .trim_start_matches('/');
    let url = origin.join(target)?;

    let mode = headers
        .get(&SEC_FETCH_MODE)
        .and_then(|v| v.to_str().ok())
        .map(RequestMode::from_fetch_mode)
        .unwrap_or_default();

    for name in &HOP_BY_HOP {
        headers.remove(name);
    }

    Ok(Request::new(method, url)
        .with_headers(headers)
        .with_mode(mode)
        .with_body(body))
}

/// Turn the worker's answer into an axum response
pub fn into_http_response(response: Response) -> axum::response::Response {
    let (status, mut headers, body) = response.into_parts();
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }

    let mut out = axum::response::Response::new(Body::from(body));
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use axum::http::Request as HttpRequest;
    use http::header::{ACCEPT, CONTENT_TYPE};
    use http::HeaderValue;
    use tower::ServiceExt;
    use zerostore::{Error, Result};
    use zeroworker::{Fetcher, WorkerConfig, PLACEHOLDER_SVG};

    /// Toggle shared between a test and its origin
    #[derive(Default)]
    struct OfflineSwitch(AtomicBool);

    impl OfflineSwitch {
        fn set(&self, offline: bool) {
            self.0.store(offline, Ordering::SeqCst);
        }

        fn get(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Origin serving every path with a small text body, until switched off
    struct Origin {
        offline: Arc<OfflineSwitch>,
    }

    #[async_trait]
    impl Fetcher for Origin {
        async fn fetch(&self, request: &Request) -> Result<Response> {
            if self.offline.get() {
                return Err(Error::Network("origin down".to_string()));
            }
            Ok(Response::new(StatusCode::OK, format!("origin {}", request.url().path()))
                .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain")))
        }
    }

    async fn activated_app() -> (Router, Arc<OfflineSwitch>) {
        let offline = Arc::new(OfflineSwitch::default());
        let origin = Url::parse("http://origin.test/").unwrap();
        let store = Arc::new(MemoryCacheStore::new());
        let worker = ServiceWorker::new(
            WorkerConfig::default().with_scope(origin.clone()),
            store.clone(),
            Arc::new(Origin {
                offline: Arc::clone(&offline),
            }),
        );
        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        let state = Arc::new(AppState {
            worker,
            store,
            origin,
        });
        (app(state), offline)
    }

    async fn body_of(response: axum::response::Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[test]
    fn test_intercepted_request_mapping() {
        let origin = Url::parse("http://origin.test/site/").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("127.0.0.1:8080"));
        headers.insert(SEC_FETCH_MODE, HeaderValue::from_static("navigate"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
        let uri: Uri = "/docs/page.html?lang=en".parse().unwrap();

        let request =
            intercepted_request(&origin, Method::GET, &uri, headers, Bytes::new()).unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://origin.test/site/docs/page.html?lang=en"
        );
        assert_eq!(request.mode(), RequestMode::Navigate);
        assert!(request.headers().get(HOST).is_none());
        assert!(request.accepts("text/html"));
    }

    #[test]
    fn test_root_maps_to_origin() {
        let origin = Url::parse("http://origin.test/").unwrap();
        let uri: Uri = "/".parse().unwrap();
        let request =
            intercepted_request(&origin, Method::GET, &uri, HeaderMap::new(), Bytes::new())
                .unwrap();

        assert_eq!(request.url().as_str(), "http://origin.test/");
        assert_eq!(request.mode(), RequestMode::NoCors);
    }

    #[test]
    fn test_response_drops_hop_by_hop_headers() {
        let response = Response::new(StatusCode::NOT_FOUND, "gone")
            .with_header(TRANSFER_ENCODING, HeaderValue::from_static("chunked"))
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let out = into_http_response(response);

        assert_eq!(out.status(), StatusCode::NOT_FOUND);
        assert!(out.headers().get(TRANSFER_ENCODING).is_none());
        assert_eq!(out.headers().get(CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[tokio::test]
    async fn test_serves_cache_when_origin_down() {
        let (app, offline) = activated_app().await;
        offline.set(true);

        let response = app
            .clone()
            .oneshot(HttpRequest::get("/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_of(response).await.as_ref(), b"origin /app.js");

        let response = app
            .clone()
            .oneshot(
                HttpRequest::get("/missing")
                    .header("sec-fetch-mode", "navigate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_of(response).await.as_ref(), b"origin /offline.html");

        let response = app
            .oneshot(
                HttpRequest::get("/images/x.png")
                    .header("accept", "image/png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "image/svg+xml");
        assert_eq!(body_of(response).await.as_ref(), PLACEHOLDER_SVG.as_bytes());
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let (app, _) = activated_app().await;

        let response = app
            .oneshot(HttpRequest::get(STATS_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stats: Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(stats["state"], "activated");
        assert_eq!(stats["namespace"], "zero::v1.0.2");
        assert_eq!(stats["worker"]["priority_stored"], 5);
    }
}
