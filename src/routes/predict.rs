use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use crate::models::{
    ChildPredictionResponse, Domain, GdmPredictionResponse, HealthResponse, PredictionResult, RawInputRecord,
};
use crate::routes::{ApiError, AppState};

/// Configure prediction and health routes
///
/// Each path is its own resource, so other methods get 405 instead of
/// reaching the asset catch-all.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::resource("/health").route(web::get().to(health_check)))
        .service(web::resource("/predict_gdm").route(web::post().to(predict_gdm)))
        .service(web::resource("/predict_child").route(web::post().to(predict_child)));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Gestational diabetes prediction
///
/// POST /predict_gdm
///
/// Request body:
/// ```json
/// {
///   "AgeAtStartOfSpell": 30,
///   "WeightMeasured": 70,
///   "Height": 165,
///   "BodyMassIndexAtBooking": 25.7,
///   "Obese": "No",
///   "Ethnicity": "White",
///   "Glucoselevelblood": 5.4
/// }
/// ```
async fn predict_gdm(
    state: web::Data<AppState>,
    req: web::Json<RawInputRecord>,
) -> Result<HttpResponse, ApiError> {
    let result = run_prediction(&state, Domain::Maternal, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(GdmPredictionResponse::from(result)))
}

/// Child outcome prediction
///
/// POST /predict_child
///
/// The body carries every child outcome feature; the response adds the five
/// features with the highest gain importance.
async fn predict_child(
    state: web::Data<AppState>,
    req: web::Json<RawInputRecord>,
) -> Result<HttpResponse, ApiError> {
    let result = run_prediction(&state, Domain::ChildOutcome, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ChildPredictionResponse::from(result)))
}

/// Run inference on the blocking pool and map every failure to a 400
async fn run_prediction(
    state: &AppState,
    domain: Domain,
    record: RawInputRecord,
) -> Result<PredictionResult, ApiError> {
    let request_id = Uuid::new_v4();
    let predictor = state.predictor.clone();

    match web::block(move || predictor.predict(domain, &record)).await {
        Ok(Ok(result)) => {
            tracing::info!(
                %request_id,
                "{} prediction: label={} probability={:.4}",
                domain,
                result.label.as_u8(),
                result.probability
            );
            Ok(result)
        }
        Ok(Err(e)) => {
            tracing::info!(%request_id, "{} prediction rejected: {}", domain, e);
            Err(ApiError::bad_request(e.to_string()))
        }
        Err(e) => {
            tracing::error!(%request_id, "{} prediction did not complete: {}", domain, e);
            Err(ApiError::bad_request(e.to_string()))
        }
    }
}
