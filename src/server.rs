use std::net::SocketAddr;

use anyhow::Result;
use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::factcheck::FactChecker;
use crate::models::{
    DiseaseRecord, FactCheckRequest, FactCheckResponse, HopRequest, HopResponse, OutbreakRequest,
    OutbreakResponse, SummaryRequest, SummaryResponse,
};
use crate::outbreak::{random_disease_color, random_disease_name, HopRow, OriginRow, OutbreakLog};
use crate::summary::SummaryService;

#[derive(Clone)]
struct AppState {
    checker: FactChecker,
    summary: SummaryService,
    outbreak_log: OutbreakLog,
}

pub async fn run_server(
    config: AppConfig,
    checker: FactChecker,
    summary: SummaryService,
    outbreak_log: OutbreakLog,
) -> Result<()> {
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let state = AppState {
        checker,
        summary,
        outbreak_log,
    };

    let app = Router::new()
        .route("/", get(index_page))
        .route("/api/fact-check", post(fact_check_handler))
        .route("/api/summary", post(summary_handler))
        .route("/api/airports", get(list_airports))
        .route("/api/outbreaks", post(start_outbreak))
        .route("/api/outbreaks/:instance_id/hops", post(log_hop))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config.bind_addr.parse()?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index_page() -> Result<Html<String>, ApiError> {
    let template = IndexTemplate {
        airports: crate::outbreak::AIRPORTS.to_vec(),
    };
    let body = template.render().map_err(ApiError::from)?;
    Ok(Html(body))
}

async fn fact_check_handler(
    State(state): State<AppState>,
    Json(request): Json<FactCheckRequest>,
) -> Result<Json<FactCheckResponse>, ApiError> {
    if request.disease_name.trim().is_empty() {
        return Err(ApiError::bad_request("disease_name must not be empty"));
    }

    let record = DiseaseRecord::from_parts(
        request.disease_name,
        &request.symptoms,
        &request.transmission_from,
        &request.transmission_to,
    );

    let outcome = state.checker.check(&request.text, &record).await;
    Ok(Json(FactCheckResponse {
        had_misinformation: !outcome.corrections.is_empty(),
        corrected_text: outcome.corrected_text,
        corrections: outcome.corrections,
    }))
}

async fn summary_handler(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    if request.disease_name.trim().is_empty() {
        return Err(ApiError::bad_request("disease_name must not be empty"));
    }

    let record = DiseaseRecord::from_parts(
        request.disease_name,
        &request.symptoms,
        &request.transmission_from,
        &request.transmission_to,
    );

    let outcome = state.summary.generate_and_verify(&record).await;
    Ok(Json(SummaryResponse {
        had_misinformation: !outcome.corrections.is_empty(),
        summary: outcome.corrected_text,
        corrections: outcome.corrections,
    }))
}

async fn list_airports() -> Json<Vec<crate::outbreak::Airport>> {
    Json(crate::outbreak::AIRPORTS.to_vec())
}

async fn start_outbreak(
    State(state): State<AppState>,
    Json(request): Json<OutbreakRequest>,
) -> Result<Json<OutbreakResponse>, ApiError> {
    let instance_id = Uuid::new_v4().to_string();
    let disease_name = request
        .disease_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(random_disease_name);
    let color = random_disease_color();

    state.outbreak_log.log_origin(&OriginRow {
        instance_id: instance_id.clone(),
        disease_name: disease_name.clone(),
        origin_airport: request.origin_airport,
        timestamp: Utc::now(),
    })?;

    Ok(Json(OutbreakResponse {
        instance_id,
        disease_name,
        color,
    }))
}

async fn log_hop(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    Json(request): Json<HopRequest>,
) -> Result<Json<HopResponse>, ApiError> {
    state.outbreak_log.log_hop(&HopRow {
        instance_id: instance_id.clone(),
        timestamp: Utc::now(),
        location_name: request.location_name,
        location_type: request.location_type,
        lat: request.lat,
        lng: request.lng,
    })?;

    Ok(Json(HopResponse {
        instance_id,
        logged: true,
    }))
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    airports: Vec<crate::outbreak::Airport>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: value.to_string(),
        }
    }
}

impl From<askama::Error> for ApiError {
    fn from(value: askama::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: value.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
