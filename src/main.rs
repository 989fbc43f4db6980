//! Crop disease diagnosis service: accepts a leaf image by URL or upload,
//! returns ranked predictions with bilingual treatment advice.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

mod advice;
mod error;
mod model;
mod utils;

use advice::advice_for;
use error::ServiceError;
use model::{Model, Prediction, Severity};
use utils::{fetch_image, Config};

struct AppState {
    model: Option<Model>,
}

impl AppState {
    fn model(&self) -> Result<&Model, ServiceError> {
        self.model.as_ref().ok_or(ServiceError::ModelUnavailable)
    }
}

type SharedState = Arc<AppState>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env();

    info!("loading ML model...");
    let model = match Model::load(config.model_path.as_deref()) {
        Ok(model) => Some(model),
        Err(err) => {
            // Keep serving; prediction requests report the missing model.
            error!("failed to load model: {err}");
            None
        }
    };

    let shared_state = Arc::new(AppState { model });

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/predict", post(predict_url_handler))
        .route("/predict/upload", post(predict_upload_handler))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .with_state(shared_state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("listening on http://{}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

#[derive(Debug, Deserialize)]
struct PredictionRequest {
    image_url: String,
    #[serde(default)]
    crop_hint: Option<String>,
}

/// A prediction as it goes out on the wire, advice attached. Field names are
/// load-bearing for existing clients.
#[derive(Debug, Serialize)]
struct EnrichedPrediction {
    class_id: u32,
    crop: &'static str,
    disease: &'static str,
    disease_sw: &'static str,
    confidence: f64,
    severity: Severity,
    advice_en: &'static str,
    advice_sw: &'static str,
}

#[derive(Debug, Serialize)]
struct PredictionResponse {
    predictions: Vec<EnrichedPrediction>,
    processing_ms: u64,
    timestamp: String,
}

fn enrich(predictions: Vec<Prediction>) -> Vec<EnrichedPrediction> {
    predictions
        .into_iter()
        .map(|prediction| {
            let advice = advice_for(prediction.disease);
            EnrichedPrediction {
                class_id: prediction.class_id,
                crop: prediction.crop,
                disease: prediction.disease,
                disease_sw: prediction.disease_sw,
                confidence: prediction.confidence,
                severity: prediction.severity,
                advice_en: advice.en,
                advice_sw: advice.sw,
            }
        })
        .collect()
}

fn assemble_response(predictions: Vec<Prediction>, started: Instant) -> PredictionResponse {
    if let Some(top) = predictions.first() {
        info!(
            "prediction complete: {} ({:.2}%)",
            top.disease,
            top.confidence * 100.0
        );
    }

    PredictionResponse {
        predictions: enrich(predictions),
        processing_ms: started.elapsed().as_millis() as u64,
        timestamp: Utc::now().to_rfc3339(),
    }
}

/// POST /predict - classify an image fetched from a URL.
async fn predict_url_handler(
    State(state): State<SharedState>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>, ServiceError> {
    let started = Instant::now();
    info!("predicting from URL: {}", request.image_url);

    let image_data = fetch_image(&request.image_url).await?;
    let predictions = state
        .model()?
        .predict(&image_data, request.crop_hint.as_deref())?;

    Ok(Json(assemble_response(predictions, started)))
}

/// POST /predict/upload - classify an uploaded image.
async fn predict_upload_handler(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<PredictionResponse>, ServiceError> {
    let started = Instant::now();

    let mut image_data = Vec::new();
    let mut crop_hint = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            image_data = field.bytes().await?.to_vec();
        } else if field.name() == Some("crop_hint") {
            crop_hint = Some(field.text().await?);
        }
    }

    if image_data.is_empty() {
        return Err(ServiceError::MissingFile);
    }

    info!("predicting from upload ({} bytes)", image_data.len());
    let predictions = state.model()?.predict(&image_data, crop_hint.as_deref())?;

    Ok(Json(assemble_response(predictions, started)))
}

/// GET /health - liveness probe.
async fn health_check(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "ml-inference",
        "timestamp": Utc::now().to_rfc3339(),
        "model_loaded": state.model.is_some(),
    }))
}

/// GET / - service info.
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "AI Crop Doctor ML Inference",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "predict_url": "/predict",
            "predict_upload": "/predict/upload",
        },
    }))
}
