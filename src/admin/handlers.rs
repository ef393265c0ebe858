use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub records: usize,
    pub tracked_clients: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        records: state.store.len(),
        tracked_clients: state.limiter.tracked_clients(),
    })
}

/// Clear every verified record.
pub async fn reset_store(State(state): State<AppState>) -> StatusCode {
    state.store.reset();
    tracing::warn!("Verification store reset via admin API");
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use crate::config::ServiceConfig;
    use crate::http::HttpServer;
    use crate::verification::VerifiedRecord;
    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{header::AUTHORIZATION, Method, Request, StatusCode},
    };
    use std::net::SocketAddr;
    use tower::ServiceExt;

    fn admin_server() -> HttpServer {
        let mut config = ServiceConfig::default();
        config.admin.enabled = true;
        config.admin.api_key = "test-admin-key".into();
        HttpServer::new(config)
    }

    fn admin_request(method: Method, uri: &str, key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", key));
        }
        let mut request = builder.body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))));
        request
    }

    #[tokio::test]
    async fn test_status_requires_key() {
        let app = admin_server().router();

        let res = app
            .clone()
            .oneshot(admin_request(Method::GET, "/admin/status", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app
            .oneshot(admin_request(Method::GET, "/admin/status", Some("wrong")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_status_reports_counts() {
        let server = admin_server();
        server.state().store.add(VerifiedRecord::new("a@b.com", "email"));
        server.state().limiter.allow("10.1.1.1");

        let res = server
            .router()
            .oneshot(admin_request(Method::GET, "/admin/status", Some("test-admin-key")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "operational");
        assert_eq!(json["records"], 1);
        assert_eq!(json["tracked_clients"], 1);
    }

    #[tokio::test]
    async fn test_reset_clears_store() {
        let server = admin_server();
        let store = server.state().store.clone();
        store.add(VerifiedRecord::new("a@b.com", "email"));

        let res = server
            .router()
            .oneshot(admin_request(Method::POST, "/admin/reset", Some("test-admin-key")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(store.lookup("a@b.com").is_none());
    }
}
