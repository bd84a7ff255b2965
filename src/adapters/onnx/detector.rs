use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::RgbImage;
use tracing::debug;

use crate::application::ports::DetectorPort;
use crate::domain::detection::RawDetection;
use crate::domain::errors::{ApiError, ApiResult};
use crate::domain::model::{YoloParams, MODEL_NOT_LOADED};

use super::yolo_engine::OnnxYoloEngine;

/// Proveedor de detección sobre ONNX Runtime. La sesión exige acceso
/// exclusivo, así que las pasadas se serializan con un mutex y se
/// ejecutan en el pool de hilos bloqueantes.
pub struct OnnxDetector {
    engine: Arc<Mutex<OnnxYoloEngine>>,
}

impl OnnxDetector {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let engine = OnnxYoloEngine::load(path)?;
        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
        })
    }
}

#[async_trait]
impl DetectorPort for OnnxDetector {
    async fn detect(&self, image: RgbImage, conf: f32, iou: f32) -> ApiResult<Vec<RawDetection>> {
        let engine = Arc::clone(&self.engine);
        let params = YoloParams {
            conf_threshold: conf,
            iou_threshold: iou,
            ..YoloParams::default()
        };
        debug!("Pasada de inferencia con conf={conf} iou={iou}");

        tokio::task::spawn_blocking(move || {
            let mut engine = engine
                .lock()
                .map_err(|_| ApiError::Internal("inference engine lock poisoned".into()))?;
            engine
                .infer(&image, &params)
                .map_err(|e| ApiError::Provider(format!("Inference error: {e}")))
        })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
    }

    fn ready(&self) -> bool {
        true
    }
}

/// Proveedor sustituto para cuando el modelo no se pudo cargar en el
/// arranque. El servidor sigue sirviendo el resto de la API.
pub struct OfflineDetector;

#[async_trait]
impl DetectorPort for OfflineDetector {
    async fn detect(
        &self,
        _image: RgbImage,
        _conf: f32,
        _iou: f32,
    ) -> ApiResult<Vec<RawDetection>> {
        Err(ApiError::Provider(MODEL_NOT_LOADED.into()))
    }

    fn ready(&self) -> bool {
        false
    }
}
