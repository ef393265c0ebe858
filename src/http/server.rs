//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Gate `/verify` behind the per-IP rate limiter
//! - Mount the admin routes when enabled
//! - Run the rate limiter sweep for the lifetime of the server
//! - Serve with graceful shutdown

use axum::{
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::{AdminConfig, ServiceConfig, VerificationConfig};
use crate::http::handlers::{health, lookup_verification, record_verification};
use crate::http::request::{request_span, MakeRequestUuidV4};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::security::rate_limit::{rate_limit_middleware, IpRateLimiter};
use crate::verification::VerificationStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<VerificationStore>,
    pub limiter: Arc<IpRateLimiter>,
    pub verification: VerificationConfig,
    pub admin: AdminConfig,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            store: Arc::new(VerificationStore::new()),
            limiter: Arc::new(IpRateLimiter::from_config(&config.rate_limit)),
            verification: config.verification.clone(),
            admin: config.admin.clone(),
        }
    }
}

/// HTTP server for the verification API.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with fresh state.
    pub fn new(config: ServiceConfig) -> Self {
        let state = AppState::new(&config);
        Self::with_state(config, state)
    }

    /// Create a server around existing state.
    pub fn with_state(config: ServiceConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let mut api = Router::new().route(
            "/verify",
            get(lookup_verification).post(record_verification),
        );
        if config.rate_limit.enabled {
            api = api.layer(middleware::from_fn_with_state(
                state.limiter.clone(),
                rate_limit_middleware,
            ));
        }

        let mut app = Router::new().route("/health", get(health)).merge(api);
        if config.admin.enabled {
            app = app.merge(admin::router(state.clone()));
        }

        app.with_state(state)
            .route_layer(middleware::from_fn(metrics::track_requests))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::new(config.timeouts.request())),
            )
    }

    /// Run the server until `shutdown_rx` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let cleanup = self.config.rate_limit.enabled.then(|| {
            self.state.limiter.start_cleanup_loop(
                self.config.rate_limit.cleanup_interval(),
                self.config.rate_limit.idle_timeout(),
            )
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await;

        if let Some(task) = cleanup {
            task.stop().await;
        }

        tracing::info!("HTTP server stopped");
        result
    }

    /// Get a clone of the router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn request_from(ip: [u8; 4], uri: &str) -> Request<Body> {
        let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((ip, 5555))));
        request
    }

    fn limited_server(rps: f64, burst: u32) -> HttpServer {
        let mut config = ServiceConfig::default();
        config.rate_limit.requests_per_second = rps;
        config.rate_limit.burst_size = burst;
        HttpServer::new(config)
    }

    #[tokio::test]
    async fn test_rate_limit_returns_429() {
        let app = limited_server(0.01, 2).router();

        for _ in 0..2 {
            let res = app
                .clone()
                .oneshot(request_from([1, 2, 3, 4], "/verify?value=x"))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res = app
            .oneshot(request_from([1, 2, 3, 4], "/verify?value=x"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_ip() {
        let app = limited_server(0.01, 1).router();

        let a1 = app.clone().oneshot(request_from([10, 0, 0, 1], "/verify?value=x")).await.unwrap();
        let b1 = app.clone().oneshot(request_from([10, 0, 0, 2], "/verify?value=x")).await.unwrap();
        let a2 = app.oneshot(request_from([10, 0, 0, 1], "/verify?value=x")).await.unwrap();

        assert_eq!(a1.status(), StatusCode::OK);
        assert_eq!(b1.status(), StatusCode::OK);
        assert_eq!(a2.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_denied_request_does_not_reach_handler() {
        let server = limited_server(0.01, 1);
        let app = server.router();
        let store = server.state().store.clone();

        let post = |value: &str| {
            let mut request = Request::builder()
                .method(Method::POST)
                .uri("/verify")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(r#"{{"value":"{}","type":"email"}}"#, value)))
                .unwrap();
            request
                .extensions_mut()
                .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 9], 1))));
            request
        };

        let first = app.clone().oneshot(post("first@x.com")).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let second = app.oneshot(post("second@x.com")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

        assert!(store.lookup("first@x.com").is_some());
        assert!(store.lookup("second@x.com").is_none());
    }

    #[tokio::test]
    async fn test_missing_client_address_is_internal_error() {
        let server = limited_server(1.0, 1);
        let app = server.router();

        let request = Request::builder()
            .uri("/verify?value=x")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(request).await.unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(server.state().limiter.tracked_clients(), 0);
    }

    #[tokio::test]
    async fn test_health_is_not_rate_limited() {
        let app = limited_server(0.01, 1).router();
        for _ in 0..5 {
            let res = app.clone().oneshot(request_from([1, 1, 1, 1], "/health")).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_disabled_rate_limit_never_denies() {
        let mut config = ServiceConfig::default();
        config.rate_limit.enabled = false;
        config.rate_limit.burst_size = 1;
        let app = HttpServer::new(config).router();

        for _ in 0..5 {
            let res = app.clone().oneshot(request_from([1, 1, 1, 1], "/verify?value=x")).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mut config = ServiceConfig::default();
        config.security.max_body_size = 32;
        let app = HttpServer::new(config).router();

        let body = format!(r#"{{"value":"{}","type":"email"}}"#, "a".repeat(64));
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("/verify")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([1, 1, 1, 1], 1))));

        let res = app.oneshot(request).await.unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_admin_routes_absent_by_default() {
        let app = HttpServer::new(ServiceConfig::default()).router();
        let res = app.oneshot(request_from([1, 1, 1, 1], "/admin/status")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
