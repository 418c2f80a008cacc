// 🌐 HTTP API - axum router and handlers
// JSON endpoints for the browser client plus the HTML landing page

use askama::Template;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::error::FootprintError;
use crate::models::{
    Country, CountryIntensity, EmissionFactor, EnergySource, FootprintInput, FootprintResult,
    RegionEmission,
};
use crate::recommendations::Recommendation;
use crate::service::FootprintService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FootprintService>,
}

impl AppState {
    pub fn new(service: FootprintService) -> Self {
        AppState {
            service: Arc::new(service),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Serialize)]
struct CountriesResponse {
    success: bool,
    countries: Vec<Country>,
}

#[derive(Serialize)]
struct CountryResponse {
    success: bool,
    #[serde(flatten)]
    country: Country,
}

#[derive(Serialize)]
struct NotFoundResponse {
    success: bool,
    message: &'static str,
}

#[derive(Serialize)]
struct CalculateResponse {
    success: bool,
    results: FootprintResult,
    country_code: String,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct StatisticsResponse {
    success: bool,
    regions: Vec<RegionEmission>,
    most_polluting: Vec<CountryIntensity>,
    cleanest: Vec<CountryIntensity>,
    energy_sources: Vec<EnergySource>,
}

#[derive(Serialize)]
struct FactorsResponse {
    success: bool,
    factors: Vec<EmissionFactor>,
}

#[derive(Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub results: FootprintResult,
}

#[derive(Serialize)]
struct RecommendationsResponse {
    success: bool,
    recommendations: Vec<Recommendation>,
}

fn malformed(rejection: JsonRejection) -> FootprintError {
    FootprintError::MalformedRequest(rejection.body_text())
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/countries - All countries ordered by name
async fn get_countries(State(state): State<AppState>) -> Result<Response, FootprintError> {
    let countries = state.service.countries()?;

    Ok(Json(CountriesResponse {
        success: true,
        countries,
    })
    .into_response())
}

/// GET /api/country-intensity/:code - One country, or success:false
async fn get_country_intensity(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, FootprintError> {
    match state.service.country(&code) {
        Ok(country) => Ok(Json(CountryResponse {
            success: true,
            country,
        })
        .into_response()),
        Err(FootprintError::CountryNotFound(_)) => Ok(Json(NotFoundResponse {
            success: false,
            message: "not found",
        })
        .into_response()),
        Err(e) => Err(e),
    }
}

/// POST /api/calculate - Compute a monthly/annual footprint
async fn calculate(
    State(state): State<AppState>,
    payload: Result<Json<FootprintInput>, JsonRejection>,
) -> Result<Response, FootprintError> {
    let Json(input) = payload.map_err(malformed)?;

    let results = state.service.calculate(&input).map_err(|e| {
        if let FootprintError::CountryNotFound(code) = &e {
            tracing::info!("Calculation requested for unknown country {code}");
        }
        e
    })?;

    Ok(Json(CalculateResponse {
        success: true,
        results,
        country_code: input.country_code,
        timestamp: Utc::now(),
    })
    .into_response())
}

/// GET /api/statistics - Regional aggregates, rankings and energy sources
async fn get_statistics(State(state): State<AppState>) -> Result<Response, FootprintError> {
    let stats = state.service.statistics()?;

    Ok(Json(StatisticsResponse {
        success: true,
        regions: stats.regions,
        most_polluting: stats.most_polluting,
        cleanest: stats.cleanest,
        energy_sources: stats.energy_sources,
    })
    .into_response())
}

/// GET /api/emission-factors - Factor table used by the calculator
async fn get_emission_factors(State(state): State<AppState>) -> Result<Response, FootprintError> {
    let factors = state.service.emission_factors()?;

    Ok(Json(FactorsResponse {
        success: true,
        factors,
    })
    .into_response())
}

/// POST /api/recommendations - Advice for a previously computed result
async fn get_recommendations(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Response, FootprintError> {
    let Json(request) = payload.map_err(malformed)?;
    let recommendations = state
        .service
        .recommendations(&request.results.category_totals());

    Ok(Json(RecommendationsResponse {
        success: true,
        recommendations,
    })
    .into_response())
}

// ============================================================================
// Landing page
// ============================================================================

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    countries: Vec<Country>,
    global_avg: f64,
    min_intensity: f64,
    max_intensity: f64,
}

/// GET / - Country picker and global intensity figures
async fn serve_index(State(state): State<AppState>) -> Result<Response, FootprintError> {
    let summary = state.service.intensity_summary()?;
    let template = IndexTemplate {
        countries: state.service.countries()?,
        global_avg: summary.global_avg,
        min_intensity: summary.min_intensity,
        max_intensity: summary.max_intensity,
    };

    let html = template
        .render()
        .map_err(|e| FootprintError::Storage(anyhow::anyhow!("Template error: {}", e)))?;

    Ok((StatusCode::OK, Html(html)).into_response())
}

// ============================================================================
// Router
// ============================================================================

/// Build the full application. `static_dir` is served under /static when given.
pub fn create_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/countries", get(get_countries))
        .route("/country-intensity/:code", get(get_country_intensity))
        .route("/calculate", post(calculate))
        .route("/statistics", get(get_statistics))
        .route("/emission-factors", get(get_emission_factors))
        .route("/recommendations", post(get_recommendations))
        .with_state(state.clone());

    let mut app = Router::new()
        .route("/", get(serve_index))
        .with_state(state)
        .nest("/api", api_routes);

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
