use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, info_span, warn};

use crate::metrics::TimedOperation;
use crate::state::AppState;

const RECOMMENDATIONS: [&str; 3] = [
    "Consult with a qualified healthcare professional",
    "Do not self-diagnose or self-medicate",
    "Follow medical advice from licensed practitioners",
];

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match self {
            ApiError::BadRequest(message) | ApiError::Internal(message) => message,
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/symptoms", get(symptoms))
        .route("/api/disease", get(disease))
        .route("/api/helplines", get(helplines))
        .route("/api/reload", post(reload))
        .route("/api/metrics", get(metrics))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    diseases: usize,
    symptoms: usize,
    knowledge_version: String,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let pipeline = state.pipeline();
    let store = pipeline.store();

    Json(HealthResponse {
        status: "ok",
        message: "API server is running",
        diseases: store.disease_count(),
        symptoms: store.vocabulary().len(),
        knowledge_version: store.fingerprint().to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: Option<String>,
    age: Option<u32>,
    sex: Option<String>,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    info_span!("chat", %request_id).in_scope(|| handle_chat(&state, payload))
}

fn handle_chat(
    state: &AppState,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            state.metrics.record_rejected();
            warn!(error = %rejection, "Rejected chat request body");
            return Err(ApiError::BadRequest(format!("Invalid request body: {}", rejection)));
        }
    };

    let Some(message) = req.message else {
        state.metrics.record_rejected();
        return Err(ApiError::BadRequest("Missing 'message' field in request".to_string()));
    };
    let message = message.trim();
    if message.is_empty() {
        state.metrics.record_rejected();
        return Err(ApiError::BadRequest("Message cannot be empty".to_string()));
    }

    let timer = TimedOperation::start();
    let result = state.pipeline().analyze(message, req.age, req.sex);
    let level = result.overall_triage.as_ref().map(|t| t.level);
    state
        .metrics
        .record_analysis(timer.elapsed(), result.success, level);

    info!(
        success = result.success,
        diagnoses = result.diagnoses.len(),
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "Chat analyzed"
    );

    Ok(Json(json!({
        "success": result.success,
        "message": message,
        "diagnoses": result.diagnoses,
        "triage": result.overall_triage,
        "overall_triage": result.overall_triage,
        "symptoms_extracted": result.symptoms_extracted,
        "precautions": result.mapped_precautions,
        "result": result,
    })))
}

async fn symptoms(State(state): State<Arc<AppState>>) -> Json<Value> {
    let pipeline = state.pipeline();
    let symptoms: Vec<&str> = pipeline
        .store()
        .vocabulary()
        .iter()
        .map(|s| s.as_str())
        .collect();

    Json(json!({
        "success": true,
        "count": symptoms.len(),
        "symptoms": symptoms,
    }))
}

#[derive(Debug, Deserialize)]
struct DiseaseQuery {
    name: Option<String>,
}

async fn disease(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DiseaseQuery>,
) -> Result<Json<Value>, ApiError> {
    let name = query
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing 'name' query parameter".to_string()))?;

    let pipeline = state.pipeline();
    let store = pipeline.store();

    let description = store
        .info_of(&name)
        .filter(|info| !info.is_empty())
        .map(|info| info.description())
        .unwrap_or_else(|| format!("Information about {}", name));
    let symptoms: Vec<&str> = store
        .symptoms_of(&name)
        .map(|set| set.iter().map(|s| s.as_str()).collect())
        .unwrap_or_default();

    Ok(Json(json!({
        "success": true,
        "name": name,
        "description": description,
        "symptoms": symptoms,
        "precautions": store.precautions_of(&name),
        "recommendations": RECOMMENDATIONS,
    })))
}

async fn helplines() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "emergency_numbers": [
                { "name": "Ambulance", "number": "102" },
                { "name": "Police", "number": "100" }
            ],
            "nearby_hospitals": [
                { "name": "District Hospital", "phone": "01234-567890", "distance_km": 2.1 }
            ],
            "ngos": [
                { "name": "Health NGO", "phone": "09876-543210" }
            ]
        }
    }))
}

async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let worker = state.clone();
    let outcome = tokio::task::spawn_blocking(move || worker.reload())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(format!("{:#}", e)))?;

    Ok(Json(json!({ "success": true, "reload": outcome })))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "success": true, "metrics": state.metrics.snapshot() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::Body;
    use axum::http::Request;
    use knowledge::KnowledgeStore;
    use pipeline::Pipeline;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let (store, _) = KnowledgeStore::from_csv(
            "Disease,Symptom_1,Symptom_2,Symptom_3\n\
             Common Cold, fever, cough, headache\n\
             Pneumonia, fever, cough, chest_pain\n",
            "Disease,Description\nPneumonia,Infection that inflames the air sacs in the lungs.\n",
            "Disease,Precaution_1,Precaution_2\nCommon Cold,drink warm fluids,rest\n",
        );
        let mut config = AppConfig::default();
        config.data.dir = "/nonexistent/triage-data".into();
        AppState::with_pipeline(config, Pipeline::with_defaults(Arc::new(store)))
    }

    async fn send(state: Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
        let response = router(state).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(test_state(), get("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["diseases"], 2);
        assert_eq!(body["symptoms"], 4);
        assert!(body["knowledge_version"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_chat_analyzes_message() {
        let state = test_state();
        let (status, body) = send(
            state.clone(),
            post_json("/api/chat", json!({ "message": "I have a fever, cough and headache", "age": 30 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["diagnoses"][0]["name"], "Common Cold");
        assert_eq!(body["diagnoses"][0]["match_count"], 3);
        assert_eq!(body["precautions"]["disease"], "Common Cold");
        assert_eq!(body["overall_triage"]["level"], "Moderate");
        assert_eq!(body["triage"], body["overall_triage"]);
        assert_eq!(body["result"]["age"], 30);
        assert_eq!(state.metrics.snapshot().successful_analyses, 1);
    }

    #[tokio::test]
    async fn test_chat_without_matches_has_empty_precautions() {
        let (status, body) = send(test_state(), post_json("/api/chat", json!({ "message": "my knee feels odd" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["diagnoses"], json!([]));
        assert_eq!(body["precautions"], json!({}));
    }

    #[tokio::test]
    async fn test_chat_rejects_missing_and_blank_message() {
        let state = test_state();

        let (status, body) = send(state.clone(), post_json("/api/chat", json!({ "age": 30 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing 'message' field in request");

        let (status, body) = send(state.clone(), post_json("/api/chat", json!({ "message": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message cannot be empty");

        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let (status, _) = send(state.clone(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(state.metrics.snapshot().rejected_requests, 3);
    }

    #[tokio::test]
    async fn test_symptoms_sorted() {
        let (status, body) = send(test_state(), get("/api/symptoms")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 4);
        assert_eq!(body["symptoms"], json!(["chest_pain", "cough", "fever", "headache"]));
    }

    #[tokio::test]
    async fn test_disease_lookup() {
        let (status, body) = send(test_state(), get("/api/disease?name=Pneumonia")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "Infection that inflames the air sacs in the lungs.");
        assert_eq!(body["symptoms"], json!(["chest_pain", "cough", "fever"]));
        assert_eq!(body["precautions"], json!([]));
        assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_disease_fallback_and_missing_name() {
        let (status, body) = send(test_state(), get("/api/disease?name=Common%20Cold")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "Information about Common Cold");
        assert_eq!(body["precautions"], json!(["drink warm fluids", "rest"]));

        let (status, body) = send(test_state(), get("/api/disease")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_helplines() {
        let (status, body) = send(test_state(), get("/api/helplines")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["emergency_numbers"][0]["number"], "102");
        assert_eq!(body["data"]["emergency_numbers"][1]["number"], "100");
    }

    #[tokio::test]
    async fn test_reload_and_metrics() {
        let state = test_state();

        let (status, body) = send(state.clone(), Request::builder().method("POST").uri("/api/reload").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reload"]["changed"], true);
        assert_eq!(body["reload"]["diseases"], 0);

        let (_, body) = send(state, get("/api/metrics")).await;
        assert_eq!(body["metrics"]["reloads"], 1);
        assert_eq!(body["metrics"]["triage_levels"]["Critical"], 0);
    }
}
