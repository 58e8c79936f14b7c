//! Profiles is a small user profile manager keeping emails unique.

#![forbid(unsafe_code)]
pub mod clock;
pub mod config;
mod database;
pub mod error;
pub mod profile;
mod router;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

pub use error::ServerError;

use clock::SystemClock;
use config::Configuration;
use profile::{
    MemoryProfileRepository, PgProfileRepository, ProfileRepository,
    ProfileService,
};

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Configuration>,
    pub profiles: ProfileService,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Mark sensitive headers before they reach the trace layer.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.request_timeout),
        ))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any),
        );

    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::handler))
        // `GET /metrics` renders Prometheus metrics.
        .route("/metrics", get(render_metrics))
        .nest("/profiles", router::profiles::router())
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, String::default()),
    }
}

/// Initialize the application state.
pub async fn initialize_state(
    config: Arc<Configuration>,
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let repo: Arc<dyn ProfileRepository> = match config.storage {
        config::Storage::Memory => {
            tracing::warn!("profiles are kept in memory and lost on restart");
            Arc::new(MemoryProfileRepository::new())
        },
        config::Storage::Postgres => {
            let Some(postgres) = &config.postgres else {
                return Err(config::Error::MissingPostgres.into());
            };

            Arc::new(PgProfileRepository::new(database::connect(postgres).await?))
        },
    };

    Ok(AppState {
        profiles: ProfileService::new(repo, Arc::new(SystemClock)),
        config,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use metrics_exporter_prometheus::PrometheusBuilder;

    use super::*;

    #[tokio::test]
    async fn test_metrics_handler() {
        let response = make_request(
            app(router::state()),
            Method::GET,
            "/metrics",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState {
            metrics: Some(recorder.handle()),
            ..router::state()
        };
        let response =
            make_request(app(state), Method::GET, "/metrics", String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(std::str::from_utf8(&body).is_ok());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_trace_hides_sensitive_headers() {
        use axum::extract::Request;
        use tower::util::ServiceExt;

        let logs = Captured::default();
        let writer = logs.clone();
        let (subscriber, _) = telemetry::subscriber(move || writer.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = app(router::state())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/profiles")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, "Bearer secret-token")
                    .body(axum::body::Body::from(
                        r#"{"name":"John Doe","email":"john@example.com"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let logs = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("profile created"));
        assert!(logs.contains("authorization"));
        assert!(!logs.contains("secret-token"));
    }

    #[tokio::test]
    async fn test_initialize_memory_state() {
        let state = initialize_state(Arc::new(Configuration::default()), None)
            .await
            .unwrap();

        let profile = state
            .profiles
            .create_profile(profile::ProfileInput::new("John Doe", "john@example.com"))
            .await
            .unwrap();
        assert_eq!(
            state.profiles.get_profile(profile.id).await.unwrap(),
            Some(profile)
        );
    }
}
