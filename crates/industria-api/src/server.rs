use std::fmt;
use std::net::SocketAddr;

use axum::extract::{Path, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use industria_proto::{ApiError, ErrorCode, RecipeView, Snapshot, SCHEMA_VERSION_V1};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

use crate::Engine;

#[derive(Debug)]
pub enum ServerError {
    Io(std::io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "server io error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn recipe_not_found(name: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: ApiError::new(
                ErrorCode::RecipeNotFound,
                "no recipe carries that display name",
                Some(format!("name={name}")),
            ),
        }
    }

    fn internal(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new(ErrorCode::InternalError, message, details),
        }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

#[derive(Clone)]
struct AppState {
    engine: Engine,
}

/// Serves the presentation plane: one endpoint per control operation, JSON
/// request/response, CORS open for the external visualizer.
pub async fn serve(addr: SocketAddr, engine: Engine) -> Result<(), ServerError> {
    let app = router(AppState { engine });

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "presentation plane listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/state", get(get_state))
        .route("/api/v1/tick", post(tick_run))
        .route("/api/v1/run", post(start_run))
        .route("/api/v1/stop", post(stop_run))
        .route("/api/v1/reset", post(reset_run))
        .route("/api/v1/recipes", get(list_recipes))
        .route("/api/v1/recipes/{name}", post(set_recipe))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("Accept, Content-Type"),
    );
}

#[derive(Debug, Serialize)]
struct ControlResponse {
    schema_version: String,
    running: bool,
    tick: u64,
}

#[derive(Debug, Serialize)]
struct RecipesResponse {
    schema_version: String,
    recipes: Vec<RecipeView>,
}

#[derive(Debug, Deserialize)]
struct SetRecipeRequest {
    active: bool,
}

async fn get_state(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.engine.snapshot().await)
}

async fn tick_run(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.engine.tick().await)
}

async fn start_run(State(state): State<AppState>) -> Json<ControlResponse> {
    state.engine.run().await;
    let snapshot = state.engine.snapshot().await;
    Json(ControlResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        running: snapshot.running,
        tick: snapshot.tick,
    })
}

async fn stop_run(State(state): State<AppState>) -> Json<ControlResponse> {
    state.engine.stop().await;
    let snapshot = state.engine.snapshot().await;
    Json(ControlResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        running: snapshot.running,
        tick: snapshot.tick,
    })
}

async fn reset_run(State(state): State<AppState>) -> Result<Json<Snapshot>, HttpApiError> {
    let snapshot = state
        .engine
        .reset()
        .await
        .map_err(|err| HttpApiError::internal("failed to reset simulation", Some(err.to_string())))?;
    Ok(Json(snapshot))
}

async fn list_recipes(State(state): State<AppState>) -> Json<RecipesResponse> {
    Json(RecipesResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        recipes: state.engine.recipes().await,
    })
}

async fn set_recipe(
    Path(name): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<SetRecipeRequest>,
) -> Result<Json<RecipesResponse>, HttpApiError> {
    let Some(recipes) = state.engine.set_recipe(&name, request.active).await else {
        return Err(HttpApiError::recipe_not_found(&name));
    };
    Ok(Json(RecipesResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        recipes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_not_found_maps_to_404() {
        let err = HttpApiError::recipe_not_found("Iron Plate");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.error.code, ErrorCode::RecipeNotFound);
        assert_eq!(err.error.details.as_deref(), Some("name=Iron Plate"));
    }

    #[test]
    fn internal_errors_map_to_500() {
        let err = HttpApiError::internal("boom", None);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error.code, ErrorCode::InternalError);
    }

    #[test]
    fn api_error_payload_is_json_shaped() {
        let err = ApiError::new(ErrorCode::InvalidRequest, "bad", None);
        let encoded = serde_json::to_string(&err).expect("encodes");
        assert!(encoded.contains("invalid_request"));
    }
}
