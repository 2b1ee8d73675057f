//! HTTP server for Vellum.
//!
//! Exposes one Vellum instance over HTTP: raw blob transfer by ref, paging
//! through the index's entry log, search, and latest-content lookup.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use server::VellumServer;

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::util::ServiceExt;
    use vellum_crypto::Hasher;
    use vellum_sdk::{Fields, Vellum};

    use super::*;

    fn app_with(vellum: Vellum) -> Router {
        VellumServer::new(ServerConfig::default(), vellum).router()
    }

    fn app() -> Router {
        app_with(Vellum::in_memory())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
        let response = app
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        send(app, Method::GET, uri, Body::empty()).await
    }

    fn json(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = get(&app(), "/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["status"], "ok");
    }

    #[tokio::test]
    async fn posted_blob_can_be_fetched_by_ref() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/blob", Body::from("hello")).await;
        assert_eq!(status, StatusCode::CREATED);
        let hash = json(&body)["hash"].as_str().unwrap().to_string();
        assert_eq!(hash, Hasher::BLAKE3.hash(b"hello").to_string());

        let uri = format!("/blob/{hash}");
        let (status, _) = send(&app, Method::HEAD, &uri, Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, bytes) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn unknown_blob_is_not_found() {
        let app = app();
        let uri = format!("/blob/{}", Hasher::BLAKE3.hash(b"absent"));
        assert_eq!(send(&app, Method::HEAD, &uri, Body::empty()).await.0, StatusCode::NOT_FOUND);
        assert_eq!(get(&app, &uri).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_verifies_the_ref() {
        let app = app();
        let good = Hasher::BLAKE3.hash(b"payload");
        let uri = format!("/blob/{good}");
        let (status, _) = send(&app, Method::PUT, &uri, Body::from("payload")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(get(&app, &uri).await.1, b"payload");

        let claimed = Hasher::BLAKE3.hash(b"something else");
        let uri = format!("/blob/{claimed}");
        let (status, _) = send(&app, Method::PUT, &uri, Body::from("payload")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(get(&app, &uri).await.0, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::PUT, "/blob/not-a-ref", Body::from("x")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    fn populated() -> (Router, Vec<vellum_sdk::Ref>) {
        let vellum = Vellum::in_memory();
        let hashes = (0..3)
            .map(|i| {
                vellum
                    .write(
                        &format!("doc{i}"),
                        format!("body {i}").as_bytes(),
                        Fields::new().with("field", if i == 1 { "foo" } else { "bar" }),
                    )
                    .unwrap()
                    .hash
            })
            .collect();
        (app_with(vellum), hashes)
    }

    fn refs(body: &Value) -> Vec<String> {
        body["refs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn query_pages_the_entry_log() {
        let (app, hashes) = populated();

        let (status, body) = get(&app, "/query?limit=2").await;
        assert_eq!(status, StatusCode::OK);
        let page = json(&body);
        assert_eq!(refs(&page), vec![hashes[0].to_string(), hashes[1].to_string()]);
        let version = page["indexVersion"].as_str().unwrap().to_string();

        let uri = format!("/query?fromEntry=3&limit=2&indexVersion={version}");
        let (status, body) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(refs(&json(&body)), vec![hashes[2].to_string()]);
    }

    #[tokio::test]
    async fn query_error_statuses() {
        let (app, _) = populated();
        assert_eq!(get(&app, "/query?fromEntry=10").await.0, StatusCode::NOT_FOUND);
        assert_eq!(get(&app, "/query?limit=0").await.0, StatusCode::NOT_FOUND);
        let (status, body) = get(&app, "/query?indexVersion=other").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json(&body)["error"].as_str().unwrap().starts_with("index version mismatch"));
        assert_eq!(get(&app, "/query?offset=1").await.0, StatusCode::BAD_REQUEST);
        assert_eq!(get(&app, "/query?limit=many").await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_by_field() {
        let (app, hashes) = populated();
        let (status, body) = get(&app, "/search?q=field:foo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(refs(&json(&body)), vec![hashes[1].to_string()]);

        let (_, body) = get(&app, "/search?q=field:bar&limit=1").await;
        assert_eq!(refs(&json(&body)), vec![hashes[2].to_string()]);

        assert_eq!(get(&app, "/search?q=%22open").await.0, StatusCode::BAD_REQUEST);
        assert_eq!(get(&app, "/search?q=like:field:x").await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn content_lookup_by_id() {
        let (app, hashes) = populated();
        let (status, body) = get(&app, "/content/doc1").await;
        assert_eq!(status, StatusCode::OK);
        let content = json(&body);
        assert_eq!(content["id"], "doc1");
        assert_eq!(content["hash"], hashes[1].to_string());
        assert_eq!(content["fields"]["field"], "foo");

        assert_eq!(get(&app, "/content/missing").await.0, StatusCode::NOT_FOUND);
    }
}
