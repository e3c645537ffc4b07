mod config;
pub mod convert;
mod resolve;
pub mod schema;

use async_graphql::ErrorExtensions;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware;
use axum::response::{Html, Response as AxumResponse};
use axum::{
    Router,
    extract::State,
    http::{Method, header},
    routing::get,
};
pub use config::{AppConfig, ConfigError, parse_origins};
use std::time::Duration;
use timeline_shared::api::endpoints as ep;
use timeline_shared::domain::DateError;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info_span;
use uuid::Uuid;

use crate::llm::{GenerateError, TimelineGenerator};
use crate::storage::{StorageError, Store};
use schema::TimelineSchema;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Store,
    pub generator: TimelineGenerator,
}

impl AppState {
    pub fn new(config: AppConfig, store: Store, generator: TimelineGenerator) -> Self {
        Self {
            config,
            store,
            generator,
        }
    }
}

#[derive(Clone, Debug)]
struct ReqId(pub String);

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allow_origins);
    let schema = schema::build_schema(state);

    let graphql = Router::new()
        .route(ep::GRAPHQL_PATH, get(graphql_handler).post(graphql_handler))
        .with_state(schema)
        .layer(cors);

    // Trace with request context (method, path, request_id)
    let trace = TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
        let request_id = req
            .extensions()
            .get::<ReqId>()
            .map(|r| r.0.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            request_id = %request_id,
        )
    });

    Router::new()
        .route(ep::PLAYGROUND_PATH, get(playground))
        .route(ep::HEALTH_PATH, get(health))
        .merge(graphql)
        .layer(trace)
        .layer(middleware::from_fn(add_request_id))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allow_origin(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

/// `*` allows every origin. Credentials rule out a literal wildcard, so the
/// request's own origin is echoed back instead.
fn allow_origin(origins: &[String]) -> AllowOrigin {
    if origins.iter().any(|o| o == "*") {
        return AllowOrigin::mirror_request();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(hv) => Some(hv),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "cors: skipping invalid origin");
                None
            }
        })
        .collect();
    AllowOrigin::list(allowed)
}

async fn health() -> &'static str {
    "ok"
}

async fn playground() -> Html<String> {
    Html(GraphiQLSource::build().endpoint(ep::GRAPHQL_PATH).finish())
}

async fn graphql_handler(
    State(schema): State<TimelineSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn add_request_id(
    mut req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> AxumResponse {
    let hdr = HeaderName::from_static("x-request-id");
    // Use provided x-request-id if present, else generate
    let rid = req
        .headers()
        .get(&hdr)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(ReqId(rid.clone()));
    let mut resp = next.run(req).await;
    if let Ok(hv) = HeaderValue::from_str(&rid) {
        resp.headers_mut().insert(hdr, hv);
    }
    resp
}

/// Error kinds surfaced to API clients as `extensions.code`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn invalid_input<T: Into<String>>(msg: T) -> Self {
        Self::InvalidInput(msg.into())
    }
    fn internal<E: std::fmt::Display>(e: E) -> Self {
        Self::Internal(e.to_string())
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Upstream(_) => "UPSTREAM",
            AppError::Decode(_) => "DECODE",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { entity, id } => {
                AppError::NotFound(format!("{entity} not found: {id}"))
            }
            StorageError::InvalidInput(m) => AppError::InvalidInput(m),
            other => AppError::internal(other),
        }
    }
}

impl From<GenerateError> for AppError {
    fn from(e: GenerateError) -> Self {
        match e {
            GenerateError::Llm(err) => AppError::Upstream(err.to_string()),
            GenerateError::Decode(err) => {
                AppError::Decode(format!("error parsing timeline JSON: {err}"))
            }
        }
    }
}

impl From<DateError> for AppError {
    fn from(e: DateError) -> Self {
        AppError::invalid_input(e.to_string())
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        // Do not leak internal error details to clients, but log them
        let msg = match self {
            AppError::Internal(detail) => {
                tracing::error!(kind = code, detail = %detail, "request failed");
                "internal server error".to_string()
            }
            AppError::Upstream(m) | AppError::Decode(m) => {
                tracing::error!(kind = code, message = %m, "request failed");
                m.clone()
            }
            AppError::InvalidInput(m) | AppError::NotFound(m) => {
                tracing::warn!(kind = code, message = %m, "request rejected");
                m.clone()
            }
        };
        async_graphql::Error::new(msg).extend_with(|_, e| e.set("code", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_kinds() {
        let nf: AppError = StorageError::NotFound {
            entity: "goal",
            id: "g1".into(),
        }
        .into();
        assert_eq!(nf.code(), "NOT_FOUND");
        assert_eq!(nf.to_string(), "goal not found: g1");

        let internal: AppError = StorageError::Migration("boom".into()).into();
        assert_eq!(internal.code(), "INTERNAL");
    }

    #[test]
    fn generate_errors_split_upstream_and_decode() {
        use crate::llm::LlmError;
        let up: AppError = GenerateError::Llm(LlmError::EmptyReply).into();
        assert_eq!(up.code(), "UPSTREAM");
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let dec: AppError = GenerateError::Decode(bad_json).into();
        assert_eq!(dec.code(), "DECODE");
        assert!(dec.to_string().starts_with("error parsing timeline JSON"));
    }

    #[test]
    fn internal_details_are_hidden() {
        let err = AppError::internal("pool exhausted").extend();
        assert_eq!(err.message, "internal server error");
        let err = AppError::NotFound("task not found: t1".into()).extend();
        assert_eq!(err.message, "task not found: t1");
    }

    fn layered(origins: &[&str]) -> Router {
        let origins: Vec<String> = origins.iter().map(|o| o.to_string()).collect();
        Router::new()
            .route(ep::GRAPHQL_PATH, get(health))
            .layer(cors_layer(&origins))
    }

    #[test]
    fn invalid_origins_are_skipped_without_panicking() {
        let _ = layered(&["http://ok.test", "bad\norigin"]);
    }

    #[test]
    fn wildcard_origin_layers_with_credentials() {
        let _ = layered(&["*"]);
        let _ = layered(&["http://ok.test", "*"]);
    }
}
