use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::error;

use crate::adapters::http::state::HttpState;
use crate::application::dto::{
    HealthResponse, InferenceResponse, ModelInfo, ThresholdUpdateResponse, UploadResponse,
};
use crate::domain::errors::{ApiError, ApiResult};
use crate::domain::events::ServerEvent;
use crate::domain::thresholds::{coerce_float, ThresholdError, ThresholdPatch, Thresholds};

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Provider(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{self}");
        }
        (
            status,
            Json(json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}

pub async fn upload_file(
    State(st): State<HttpState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut file: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, st.max_upload_bytes))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, st.max_upload_bytes))?;
            file = Some((filename, bytes));
            break;
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::Validation("No file part in request".into()))?;
    let response = st.inference.upload(&filename, &bytes).await?;
    Ok(Json(response))
}

pub async fn run_inference(
    State(st): State<HttpState>,
    body: Bytes,
) -> ApiResult<Json<InferenceResponse>> {
    let data = parse_json_object(&body)?;

    let filename = data
        .get("filename")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let conf = optional_threshold(&data, "conf")?;
    let iou = optional_threshold(&data, "iou")?;

    let response = st.inference.run_inference(&filename, conf, iou).await?;
    Ok(Json(response))
}

pub async fn get_thresholds(State(st): State<HttpState>) -> Json<Thresholds> {
    Json(st.inference.thresholds().current())
}

pub async fn set_thresholds(
    State(st): State<HttpState>,
    body: Bytes,
) -> ApiResult<Json<ThresholdUpdateResponse>> {
    let data = parse_json_object(&body)?;
    let patch = ThresholdPatch {
        confidence: data.get("confidence").cloned(),
        iou: data.get("iou").cloned(),
    };

    let updated = st.inference.thresholds().apply(&patch).map_err(|e| match e {
        ThresholdError::NotNumeric => ApiError::Validation("Invalid numeric values".into()),
        other => ApiError::Validation(other.to_string()),
    })?;

    st.notifier.emit(ServerEvent::ThresholdsUpdated(updated));

    Ok(Json(ThresholdUpdateResponse {
        success: true,
        confidence: updated.confidence,
        iou: updated.iou,
        message: "Thresholds updated successfully".to_string(),
    }))
}

pub async fn model_information() -> Json<ModelInfo> {
    Json(ModelInfo::current())
}

pub async fn health_check(State(st): State<HttpState>) -> Response {
    if st.inference.detector_ready() {
        Json(HealthResponse::healthy(
            st.inference.folders(),
            st.inference.thresholds().current(),
        ))
        .into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse::unhealthy()),
        )
            .into_response()
    }
}

pub async fn uploaded_file_missing() -> impl IntoResponse {
    ApiError::NotFound("File not found".into())
}

pub async fn static_file_missing() -> impl IntoResponse {
    ApiError::NotFound("Static file not found".into())
}

pub async fn endpoint_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Endpoint not found",
            "available_endpoints": [
                "/upload (POST)",
                "/inference (POST)",
                "/uploads/<filename> (GET)",
                "/static/<filename> (GET)",
                "/api/model-info (GET)",
                "/api/health (GET)",
                "/api/thresholds (GET/POST)"
            ]
        })),
    )
}

/// Los extractores de cuerpo responden al exceso de tamaño con un 413
/// plano; aquí se reescribe con el cuerpo JSON de la API.
pub fn normalize_payload_too_large(response: Response, max_bytes: usize) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }
    let already_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.as_bytes().starts_with(b"application/json"))
        .unwrap_or(false);
    if already_json {
        return response;
    }
    ApiError::PayloadTooLarge(payload_too_large_message(max_bytes)).into_response()
}

fn payload_too_large_message(max_bytes: usize) -> String {
    format!(
        "File too large. Maximum size is {:.1}MB",
        max_bytes as f64 / (1024.0 * 1024.0)
    )
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(payload_too_large_message(max_bytes))
    } else {
        ApiError::Validation(format!("Upload error: {err}"))
    }
}

/// Un cuerpo sin JSON, con JSON que no es objeto o con un objeto vacío
/// cuenta como "sin datos".
fn parse_json_object(body: &[u8]) -> ApiResult<Map<String, Value>> {
    let data: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::Validation("No JSON data provided".into()))?;
    match data {
        Value::Object(map) if !map.is_empty() => Ok(map),
        _ => Err(ApiError::Validation("No JSON data provided".into())),
    }
}

fn optional_threshold(data: &Map<String, Value>, key: &str) -> ApiResult<Option<f64>> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => coerce_float(value).map(Some).ok_or_else(|| {
            ApiError::Validation(format!(
                "Invalid parameter values: could not convert {key} to float"
            ))
        }),
    }
}
