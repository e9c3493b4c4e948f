//! Dashboard HTTP API

use crate::app_state::{AppState, SharedAppState};
use crate::cli::CommandLineArgs;
use crate::controller::LoadOutcome;
use crate::distinct::FilterOptions;
use crate::error::DashboardError;
use crate::metrics::{self, metrics_handler};
use crate::models::FilterMap;
use crate::validated_json::ValidatedJson;
use crate::view::{RenderOutcome, ViewKind};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// `axum::Router` wrapped with path normalisation.
pub type Service = NormalizePath<Router>;

/// Query parameters of the view endpoint
#[derive(Debug, Default, Deserialize)]
struct LoadParams {
    /// Render even if the view is already active
    #[serde(default)]
    force: bool,
}

/// A view listed by the schema endpoint
#[derive(Debug, Serialize)]
struct ViewInfo {
    name: ViewKind,
    title: &'static str,
}

/// Body of the schema endpoint
#[derive(Debug, Serialize)]
struct Schema {
    views: Vec<ViewInfo>,
}

/// Initialise the application
pub fn init() {
    metrics::register_metrics();
}

/// Returns a [axum::Router] for the dashboard API
///
/// The router is populated with all routes and the view endpoints are wrapped with tracing and
/// metrics layers.
///
/// # Arguments
///
/// * `state`: Shared application state
fn router(state: SharedAppState) -> Router {
    fn v1(state: SharedAppState) -> Router {
        Router::new()
            .route("/options", get(options))
            .route("/views/:view", post(load_view))
            .route("/apply", post(apply))
            .layer(
                TraceLayer::new_for_http()
                    .on_request(metrics::request_counter)
                    .on_response(metrics::record_response_metrics),
            )
            .with_state(state)
    }

    Router::new()
        .route("/.well-known/edustats-schema", get(schema))
        .route("/metrics", get(metrics_handler))
        .nest("/v1", v1(state))
}

/// Returns a [crate::app::Service] for the dashboard API
///
/// The service is populated with all routes as well as the following middleware:
///
/// * a [tower_http::normalize_path::NormalizePathLayer] for trimming trailing slashes from
///   requests
///
/// # Arguments
///
/// * `args`: Command line arguments
pub fn service(args: &CommandLineArgs) -> Result<Service, DashboardError> {
    let state = Arc::new(AppState::new(args)?);
    Ok(service_with_state(state))
}

/// Returns a [crate::app::Service] for the given application state
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn service_with_state(state: SharedAppState) -> Service {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Lists the supported views
async fn schema() -> Json<Schema> {
    Json(Schema {
        views: ViewKind::ALL
            .iter()
            .map(|kind| ViewInfo {
                name: *kind,
                title: kind.title(),
            })
            .collect(),
    })
}

/// Lists the options of the filter selectors
async fn options(State(state): State<SharedAppState>) -> Json<FilterOptions> {
    Json(FilterOptions::load(state.source.as_ref()).await)
}

/// Makes a view active and renders it
///
/// Responds with 304 Not Modified if the view is already active, unless `force` is set.
///
/// # Arguments
///
/// * `view`: Name of the view
/// * `params`: Query parameters
/// * `state`: Shared application state
/// * `filters`: Filters selected by the user
async fn load_view(
    Path(view): Path<String>,
    Query(params): Query<LoadParams>,
    State(state): State<SharedAppState>,
    ValidatedJson(filters): ValidatedJson<FilterMap>,
) -> Result<Response, DashboardError> {
    let view: ViewKind = view.parse()?;
    let outcome = state
        .controller
        .load(state.source.as_ref(), view, &filters, params.force)
        .await;
    Ok(match outcome {
        LoadOutcome::Unchanged => StatusCode::NOT_MODIFIED.into_response(),
        LoadOutcome::Rendered(outcome) => Json(outcome).into_response(),
    })
}

/// Renders the active view with new filters
///
/// # Arguments
///
/// * `state`: Shared application state
/// * `filters`: Filters selected by the user
async fn apply(
    State(state): State<SharedAppState>,
    ValidatedJson(filters): ValidatedJson<FilterMap>,
) -> Result<Json<RenderOutcome>, DashboardError> {
    let outcome = state
        .controller
        .apply(state.source.as_ref(), &filters)
        .await?;
    Ok(Json(outcome))
}
