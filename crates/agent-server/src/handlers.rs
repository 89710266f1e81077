//! HTTP Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Html,
};
use serde::{Deserialize, Serialize};

use agent_core::AgentError;
use local_advisor::AdvisorError;

use crate::render::markdown_to_html;
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm_connected: bool,
    pub image_search_configured: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub location: Option<String>,
}

/// Recipe response; text fields are HTML
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub meal: String,
    pub recipe: String,
    pub time: String,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DemoResponse {
    pub meal: String,
    pub recipe: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub route: String,
    pub stops: String,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Pages
// ============================================================================

pub async fn index_page() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

pub async fn demo_page() -> Html<&'static str> {
    Html(include_str!("../static/demo.html"))
}

pub async fn route_page() -> Html<&'static str> {
    Html(include_str!("../static/route.html"))
}

// ============================================================================
// API
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let llm_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        llm_connected,
        image_search_configured: state.image_search.is_configured(),
    })
}

/// Location → meals, recipe, time & cost, dish photos
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let location = required(body(payload)?.location, "location")?;

    let suggestion = state.recipes.suggest(&location).await.map_err(|e| chain_error(&e))?;
    let dish = state
        .recipes
        .dish_name(&suggestion.recipe)
        .await
        .map_err(|e| chain_error(&e))?;

    let images = if dish.is_empty() {
        tracing::warn!("Dish name extraction returned nothing, skipping images");
        Vec::new()
    } else {
        state.images.fetch_dish_images(&dish).await
    };

    Ok(Json(GenerateResponse {
        meal: markdown_to_html(&suggestion.meal),
        recipe: markdown_to_html(&suggestion.recipe),
        time: markdown_to_html(&suggestion.time),
        images,
    }))
}

/// Location → meals, recipe, time & cost
pub async fn demo_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<DemoResponse>, ApiError> {
    let location = required(body(payload)?.location, "location")?;

    let suggestion = state.demo.suggest(&location).await.map_err(|e| chain_error(&e))?;

    Ok(Json(DemoResponse {
        meal: markdown_to_html(&suggestion.meal),
        recipe: markdown_to_html(&suggestion.recipe),
        time: markdown_to_html(&suggestion.time),
    }))
}

/// Start + destination → route, stops, time & cost
pub async fn route_generate(
    State(state): State<AppState>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RouteResponse>, ApiError> {
    let payload = body(payload)?;
    let start = required(payload.start, "start")?;
    let destination = required(payload.destination, "destination")?;

    let plan = state
        .routes
        .plan(&start, &destination)
        .await
        .map_err(|e| chain_error(&e))?;

    Ok(Json(RouteResponse {
        route: markdown_to_html(&plan.route),
        stops: markdown_to_html(&plan.stops),
        time: markdown_to_html(&plan.time),
    }))
}

// ============================================================================
// Errors
// ============================================================================

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        (
            rejection.status(),
            Json(ErrorResponse {
                error: rejection.body_text(),
                code: "INVALID_BODY".into(),
            }),
        )
    })
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Missing required field: {field}"),
                code: "MISSING_FIELD".into(),
            }),
        )),
    }
}

fn chain_error(err: &AdvisorError) -> ApiError {
    tracing::error!("Chain error: {}", err);

    let status = match err {
        AdvisorError::Agent(AgentError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
        AdvisorError::Agent(AgentError::Auth(_) | AgentError::Provider(_)) => StatusCode::BAD_GATEWAY,
        AdvisorError::Agent(AgentError::ProviderUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            code: "CHAIN_ERROR".into(),
        }),
    )
}
