use serde::{Deserialize, Serialize};

use super::media::Folders;
use super::thresholds::{ThresholdPatch, Thresholds};

/// Eventos que el servidor difunde a los clientes del canal en tiempo
/// real. En el cable viajan como `{"event": ..., "data": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected {
        message: String,
        thresholds: Thresholds,
    },
    FileUploaded {
        filename: String,
        file_size: u64,
        message: String,
    },
    InferenceStarted {
        filename: String,
        conf: f64,
        iou: f64,
        message: String,
    },
    InferenceCompleted {
        filename: String,
        total_detections: usize,
        processing_time: f64,
        message: String,
    },
    InferenceError {
        filename: String,
        error: String,
    },
    ThresholdsUpdated(Thresholds),
    StatusUpdate(StatusPayload),
    Error {
        message: String,
    },
}

/// Estado del servicio reportado bajo demanda por el canal.
#[derive(Debug, Clone, Serialize)]
pub struct StatusPayload {
    pub model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_classes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folders: Option<Folders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Mensajes que los clientes pueden enviar por el canal.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    SetThreshold(ThresholdPatch),
    GetStatus,
}
