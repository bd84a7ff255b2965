use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Par de umbrales que gobierna la sensibilidad de la detección.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub confidence: f64,
    pub iou: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            confidence: 0.3,
            iou: 0.5,
        }
    }
}

/// Actualización parcial de umbrales. Los campos se reciben como JSON
/// crudo porque los clientes mandan tanto números como cadenas numéricas.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdPatch {
    pub confidence: Option<serde_json::Value>,
    pub iou: Option<serde_json::Value>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("Confidence must be between 0.0 and 1.0")]
    ConfidenceOutOfRange,
    #[error("IoU must be between 0.0 and 1.0")]
    IouOutOfRange,
    #[error("not a number")]
    NotNumeric,
}

pub fn in_unit_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Conversión laxa a flotante: acepta números JSON y cadenas numéricas,
/// igual que hacen los clientes del canal en tiempo real.
pub fn coerce_float(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
