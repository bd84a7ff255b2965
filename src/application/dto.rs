use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{
    media::Folders,
    model::{class_names, CLASS_LABELS, MODEL_NAME, MODEL_NOT_LOADED},
    report::{iso_timestamp, InferenceReport},
    thresholds::Thresholds,
};

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub file_size: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InferenceResponse {
    pub success: bool,
    pub output_url: String,
    pub result: InferenceReport,
    pub filename: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdUpdateResponse {
    pub success: bool,
    pub confidence: f64,
    pub iou: f64,
    pub message: String,
}

/// Ficha descriptiva del modelo cargado, estática para este despliegue.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub model_type: String,
    pub classes: Vec<String>,
    pub total_classes: usize,
    pub class_mapping: BTreeMap<String, String>,
    pub input_size: String,
    pub framework: String,
    pub output_format: String,
}

impl ModelInfo {
    pub fn current() -> Self {
        let class_mapping = CLASS_LABELS
            .iter()
            .map(|(id, label)| (id.to_string(), (*label).to_string()))
            .collect();
        Self {
            model_name: MODEL_NAME.to_string(),
            model_type: "Object Detection".to_string(),
            classes: class_names(),
            total_classes: CLASS_LABELS.len(),
            class_mapping,
            input_size: "640x640".to_string(),
            framework: "ONNX Runtime".to_string(),
            output_format: "xywh_with_confidence".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthModelInfo {
    pub name: String,
    pub classes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_info: Option<HealthModelInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folders: Option<Folders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy(folders: Folders, thresholds: Thresholds) -> Self {
        Self {
            status: "healthy".to_string(),
            model_loaded: true,
            model_info: Some(HealthModelInfo {
                name: MODEL_NAME.to_string(),
                classes: CLASS_LABELS.len(),
            }),
            folders: Some(folders),
            thresholds: Some(thresholds),
            error: None,
            timestamp: iso_timestamp(),
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            status: "unhealthy".to_string(),
            model_loaded: false,
            model_info: None,
            folders: None,
            thresholds: None,
            error: Some(MODEL_NOT_LOADED.to_string()),
            timestamp: iso_timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_info_maps_ids_to_labels() {
        let info = ModelInfo::current();
        assert_eq!(info.total_classes, 3);
        assert_eq!(info.classes, vec!["car", "bus", "truck"]);
        assert_eq!(info.class_mapping.get("2").map(String::as_str), Some("car"));
        assert_eq!(info.class_mapping.get("5").map(String::as_str), Some("bus"));
        assert_eq!(info.class_mapping.get("7").map(String::as_str), Some("truck"));
    }

    #[test]
    fn unhealthy_response_carries_the_reason() {
        let health = HealthResponse::unhealthy();
        assert_eq!(health.status, "unhealthy");
        assert!(!health.model_loaded);
        assert_eq!(health.error.as_deref(), Some(MODEL_NOT_LOADED));
        assert!(health.model_info.is_none());
    }
}
