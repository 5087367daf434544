#![recursion_limit = "256"]
// Integration tests for the HTTP surface of Maternal Risk

use actix_web::{http::StatusCode, test, web, App};
use maternal_risk::config::ModelSettings;
use maternal_risk::core::PredictionService;
use maternal_risk::routes::{self, AppState};
use maternal_risk::services::ModelStore;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(relative)
}

fn create_state(strict_not_found: bool) -> AppState {
    let settings = ModelSettings {
        dir: fixture_path("models").to_string_lossy().into_owned(),
        gdm_file: "gdm_model.txt".to_string(),
        child_file: "child_model.txt".to_string(),
    };
    let store = ModelStore::load(&settings).expect("fixture models should load");

    AppState {
        predictor: Arc::new(PredictionService::new(store.gdm_classifier(), store.child_classifier())),
        frontend_dir: Arc::new(fixture_path("frontend")),
        strict_not_found,
    }
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(routes::json_config())
                .configure(routes::configure_routes),
        )
        .await
    };
}

fn gdm_body() -> Value {
    json!({
        "AgeAtStartOfSpell": 30,
        "WeightMeasured": 70,
        "Height": 165,
        "BodyMassIndexAtBooking": 25.7,
        "Obese": "No",
        "Ethnicity": "White",
        "Glucoselevelblood": 5.4
    })
}

fn child_body() -> Value {
    json!({
        "Index_of_Multiple_Deprivation_Rank": 15000,
        "IMD_Decile": 5,
        "AgeAtStartOfSpell": 31,
        "WeightMeasured": 68,
        "Height": 163,
        "Body_Mass_Index_at_Booking": 25.6,
        "Obese": 0,
        "Ethnicity": "White",
        "Risk_Factors": "None",
        "AntenatalMedicalFactors": "None",
        "PreviousObstetricHistory": "None",
        "Parity": 1,
        "Gravida": 2,
        "Glucoselevelblood": 5.0,
        "GlucoseToleranceTest": "Normal",
        "Glucoselevel0minblood": 4.6,
        "Glucoselevel120minblood": 6.2,
        "FolicAcidDose": "400mcg",
        "SystolicBloodPressureCuff": 118,
        "Diastolic_Blood_Pressure": 76,
        "VitaminDlevelblood": 55,
        "O_Thyroidfunctionblood": 1.8,
        "Delivery_Outcome": "Spontaneous Vaginal",
        "OnsetofLabourMethod": "Spontaneous",
        "Contraction_frequency_prior_to_delivery": 4,
        "PrimaryIndicationforCaesarean": "Not Applicable",
        "Category_Caesarean_Section": "Not Applicable",
        "Perineal_care": "First Degree Tear",
        "EstimatedTotalBloodLoss": 350,
        "Gestation": 39,
        "Severely_Premature": "No",
        "Gestation_Days": 275,
        "Gestation_at_booking_Weeks": 10.5,
        "No_Of_previous_Csections": 0,
        "BabyBirthWeight": 3400,
        "Presence_of_meconium": "No",
        "BW_Centile": 52,
        "Shoulder_Dystocia": "No",
        "LOS_mother_after_delivery": 1.5,
        "Sex": "Female",
        "Still_Birth": "No",
        "TotalApgarScoreat1minutes": 9,
        "APGAR_Score_5": 10,
        "TotalApgarScoreat10minutes": 10,
        "Maternity_Month": "March"
    })
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[actix_web::test]
async fn test_predict_gdm_example_record() {
    let app = test_app!(create_state(false));

    let req = test::TestRequest::post().uri("/predict_gdm").set_json(gdm_body()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["GDM_Prediction"], 0);

    let probability = body["Probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert!((probability - sigmoid(-1.3)).abs() < 1e-9, "got {}", probability);

    let precautions = body["Precautions"].as_array().unwrap();
    assert!(!precautions.is_empty());
    assert!(body.get("TopFeatureImportances").is_none());
}

#[actix_web::test]
async fn test_predict_gdm_high_risk() {
    let app = test_app!(create_state(false));

    let mut record = gdm_body();
    record["Glucoselevelblood"] = json!(6.8);
    record["BodyMassIndexAtBooking"] = json!(34.0);
    record["Obese"] = json!("Yes");
    record["Ethnicity"] = json!("Asian");

    let req = test::TestRequest::post().uri("/predict_gdm").set_json(record).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["GDM_Prediction"], 1);
    assert!((body["Probability"].as_f64().unwrap() - sigmoid(2.1)).abs() < 1e-9);
}

#[actix_web::test]
async fn test_predict_gdm_is_idempotent() {
    let app = test_app!(create_state(false));

    let first: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post().uri("/predict_gdm").set_json(gdm_body()).to_request(),
    )
    .await;
    let second: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post().uri("/predict_gdm").set_json(gdm_body()).to_request(),
    )
    .await;

    assert_eq!(first, second);
}

#[actix_web::test]
async fn test_predict_gdm_missing_field_is_bad_request() {
    let app = test_app!(create_state(false));

    let mut record = gdm_body();
    record.as_object_mut().unwrap().remove("Height");

    let req = test::TestRequest::post().uri("/predict_gdm").set_json(record).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    let detail = body["detail"].as_str().unwrap();
    assert!(!detail.is_empty());
    assert!(detail.contains("Height"));
}

#[actix_web::test]
async fn test_predict_gdm_unknown_ethnicity_uses_fallback() {
    let app = test_app!(create_state(false));

    let mut record = gdm_body();
    record["Ethnicity"] = json!("Unknown-XYZ");

    let req = test::TestRequest::post().uri("/predict_gdm").set_json(record).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    // Fallback category lands outside every split set, like "White"
    assert!((body["Probability"].as_f64().unwrap() - sigmoid(-1.3)).abs() < 1e-9);
}

#[actix_web::test]
async fn test_predict_gdm_bad_type_is_bad_request() {
    let app = test_app!(create_state(false));

    let mut record = gdm_body();
    record["WeightMeasured"] = json!("seventy");

    let req = test::TestRequest::post().uri("/predict_gdm").set_json(record).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("WeightMeasured"));
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app!(create_state(false));

    let req = test::TestRequest::post()
        .uri("/predict_gdm")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[actix_web::test]
async fn test_non_object_body_is_bad_request() {
    let app = test_app!(create_state(false));

    let req = test::TestRequest::post().uri("/predict_child").set_json(json!([1, 2, 3])).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_predict_child_low_risk() {
    let app = test_app!(create_state(false));

    let req = test::TestRequest::post().uri("/predict_child").set_json(child_body()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["Child_OutcomePrediction"], 0);
    assert!((body["Probability"].as_f64().unwrap() - sigmoid(-1.25)).abs() < 1e-9);
    assert!(!body["Precautions"].as_array().unwrap().is_empty());

    let top = body["TopFeatureImportances"].as_object().unwrap();
    assert_eq!(top.len(), 5);
    assert_eq!(top["BabyBirthWeight"], 40.0);
    assert_eq!(top["TotalApgarScoreat1minutes"], 30.0);
    assert_eq!(top["Delivery_Outcome"], 25.0);
    assert_eq!(top["Gestation"], 10.0);
    assert_eq!(top["Glucoselevelblood"], 5.0);
    assert!(!top.contains_key("Index_of_Multiple_Deprivation_Rank"));
}

#[actix_web::test]
async fn test_predict_child_high_risk() {
    let app = test_app!(create_state(false));

    let mut record = child_body();
    record["BabyBirthWeight"] = json!(2100);
    record["Delivery_Outcome"] = json!("Emergency Caesarean");
    record["TotalApgarScoreat1minutes"] = json!(5);
    record["Gestation"] = json!(34);
    record["Glucoselevelblood"] = json!(8.0);
    record["Index_of_Multiple_Deprivation_Rank"] = json!(5000);

    let req = test::TestRequest::post().uri("/predict_child").set_json(record).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["Child_OutcomePrediction"], 1);
    assert!((body["Probability"].as_f64().unwrap() - sigmoid(2.45)).abs() < 1e-9);
}

#[actix_web::test]
async fn test_predict_child_fractional_integer_is_bad_request() {
    let app = test_app!(create_state(false));

    let mut record = child_body();
    record["Parity"] = json!(1.5);

    let req = test::TestRequest::post().uri("/predict_child").set_json(record).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "field Parity must be an integer, got 1.5");
}

#[actix_web::test]
async fn test_health_check() {
    let app = test_app!(create_state(false));

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_web::test]
async fn test_root_serves_index() {
    let app = test_app!(create_state(false));

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "text/html; charset=utf-8");

    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("<h1>Maternal Risk</h1>"));
}

#[actix_web::test]
async fn test_frontend_file_is_served() {
    let app = test_app!(create_state(false));

    let req = test::TestRequest::get().uri("/styles.css").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "text/css; charset=utf-8");
}

#[actix_web::test]
async fn test_missing_file_returns_error_body() {
    let app = test_app!(create_state(false));

    let req = test::TestRequest::get().uri("/missing.js").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "File not found"}));
}

#[actix_web::test]
async fn test_disallowed_extension_is_not_served_from_root() {
    let app = test_app!(create_state(false));

    let req = test::TestRequest::get().uri("/notes.txt").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["error"], "File not found");

    let req = test::TestRequest::get().uri("/static/notes.txt").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"fixture notes\n");
}

#[actix_web::test]
async fn test_strict_not_found_uses_404() {
    let app = test_app!(create_state(true));

    let req = test::TestRequest::get().uri("/missing.html").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "File not found");
}

#[actix_web::test]
async fn test_static_miss_is_always_404() {
    let app = test_app!(create_state(false));

    let req = test::TestRequest::get().uri("/static/missing.css").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "File not found"}));

    let req = test::TestRequest::get().uri("/static/../models/gdm_model.txt").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_wrong_method_on_prediction_routes() {
    let app = test_app!(create_state(false));

    for uri in ["/predict_gdm", "/predict_child"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "GET {}", uri);
    }

    let req = test::TestRequest::post().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
