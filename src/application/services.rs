use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use image::RgbImage;
use tracing::error;

use crate::{
    adapters::storage::MediaStore,
    application::{
        dto::{InferenceResponse, UploadResponse},
        enrich::{self, ImageMeta, Timing},
        notify::Notifier,
        ports::DetectorPort,
    },
    domain::{
        errors::{ApiError, ApiResult},
        events::{ServerEvent, StatusPayload},
        media::{self, Folders},
        model::{CLASS_LABELS, MODEL_NAME, MODEL_NOT_LOADED},
        report::{iso_timestamp, InferenceReport},
        thresholds::{coerce_float, in_unit_range, ThresholdError, ThresholdPatch, Thresholds},
    },
};

/// Par de umbrales vigente, compartido por todo el proceso. Las lecturas
/// y escrituras pasan por el candado; la última escritura gana.
#[derive(Clone)]
pub struct ThresholdStore {
    inner: Arc<RwLock<Thresholds>>,
}

impl ThresholdStore {
    pub fn new(initial: Thresholds) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn current(&self) -> Thresholds {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Aplica una actualización parcial. Se validan ambos campos antes
    /// de tocar el estado: una petición con un campo fuera de rango no
    /// modifica nada.
    pub fn apply(&self, patch: &ThresholdPatch) -> Result<Thresholds, ThresholdError> {
        let confidence = match &patch.confidence {
            Some(value) => Some(coerce_float(value).ok_or(ThresholdError::NotNumeric)?),
            None => None,
        };
        let iou = match &patch.iou {
            Some(value) => Some(coerce_float(value).ok_or(ThresholdError::NotNumeric)?),
            None => None,
        };
        if let Some(c) = confidence {
            if !in_unit_range(c) {
                return Err(ThresholdError::ConfidenceOutOfRange);
            }
        }
        if let Some(i) = iou {
            if !in_unit_range(i) {
                return Err(ThresholdError::IouOutOfRange);
            }
        }

        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(c) = confidence {
            guard.confidence = c;
        }
        if let Some(i) = iou {
            guard.iou = i;
        }
        Ok(*guard)
    }
}

/// Servicio que orquesta el ciclo completo: subida de ficheros,
/// validación, llamada al proveedor de detección y enriquecimiento del
/// resultado. Publica el progreso por el canal de notificaciones.
pub struct InferenceService {
    detector: Arc<dyn DetectorPort>,
    store: Arc<MediaStore>,
    thresholds: ThresholdStore,
    notifier: Notifier,
}

impl InferenceService {
    pub fn new(
        detector: Arc<dyn DetectorPort>,
        store: Arc<MediaStore>,
        thresholds: ThresholdStore,
        notifier: Notifier,
    ) -> Self {
        Self {
            detector,
            store,
            thresholds,
            notifier,
        }
    }

    pub fn thresholds(&self) -> &ThresholdStore {
        &self.thresholds
    }

    pub fn detector_ready(&self) -> bool {
        self.detector.ready()
    }

    pub fn folders(&self) -> Folders {
        self.store.folders()
    }

    pub fn upload_dir(&self) -> &Path {
        self.store.upload_dir()
    }

    pub fn output_dir(&self) -> &Path {
        self.store.output_dir()
    }

    /// Valida y guarda un fichero subido bajo su nombre original.
    pub async fn upload(&self, filename: &str, bytes: &[u8]) -> ApiResult<UploadResponse> {
        if filename.is_empty() {
            return Err(ApiError::Validation("No file selected".into()));
        }
        if !media::safe_filename(filename) {
            return Err(ApiError::Validation("Invalid filename".into()));
        }
        if !media::allowed_file(filename) {
            return Err(ApiError::Validation(format!(
                "File type not allowed. Supported: {}",
                media::ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let file_size = self.store.save_upload(filename, bytes).await?;

        self.notifier.emit(ServerEvent::FileUploaded {
            filename: filename.to_string(),
            file_size,
            message: format!("File {filename} uploaded successfully"),
        });

        Ok(UploadResponse {
            success: true,
            filename: filename.to_string(),
            file_size,
            message: "File uploaded successfully".to_string(),
        })
    }

    /// Ejecuta una pasada de inferencia sobre un fichero ya subido.
    /// `conf` e `iou` son opcionales; en su ausencia rigen los umbrales
    /// del proceso.
    pub async fn run_inference(
        &self,
        filename: &str,
        conf: Option<f64>,
        iou: Option<f64>,
    ) -> ApiResult<InferenceResponse> {
        if filename.is_empty() || !media::safe_filename(filename) || !media::allowed_file(filename)
        {
            return Err(ApiError::Validation("Invalid filename".into()));
        }

        let defaults = self.thresholds.current();
        let conf = conf.unwrap_or(defaults.confidence);
        let iou = iou.unwrap_or(defaults.iou);
        if !in_unit_range(conf) {
            return Err(ApiError::Validation(
                "Confidence threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if !in_unit_range(iou) {
            return Err(ApiError::Validation(
                "IoU threshold must be between 0.0 and 1.0".into(),
            ));
        }

        let input_path = self.store.upload_path(filename);
        if !input_path.exists() {
            return Err(ApiError::NotFound("File not found".into()));
        }

        self.notifier.emit(ServerEvent::InferenceStarted {
            filename: filename.to_string(),
            conf,
            iou,
            message: "Starting inference...".to_string(),
        });

        match self.infer_report(filename, &input_path, conf, iou).await {
            Ok(report) => {
                self.notifier.emit(ServerEvent::InferenceCompleted {
                    filename: filename.to_string(),
                    total_detections: report.detection_summary.total_detections,
                    processing_time: report.inference_info.total_processing_time,
                    message: "Inference completed successfully".to_string(),
                });
                Ok(InferenceResponse {
                    success: true,
                    output_url: report.image_info.url.clone(),
                    result: report,
                    filename: filename.to_string(),
                    timestamp: iso_timestamp(),
                })
            }
            Err(e) => {
                error!("Inferencia fallida para {filename}: {e}");
                self.notifier.emit(ServerEvent::InferenceError {
                    filename: filename.to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn infer_report(
        &self,
        filename: &str,
        input_path: &Path,
        conf: f64,
        iou: f64,
    ) -> ApiResult<InferenceReport> {
        let started = Instant::now();
        let thresholds = Thresholds {
            confidence: conf,
            iou,
        };

        let file_size_bytes = tokio::fs::metadata(input_path)
            .await
            .map(|m| m.len())
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let output_name = media::output_name(filename);
        let output_path = self.store.output_path(&output_name);

        // Decodificación y copia de salida fuera del executor async.
        let (image, width, height) =
            decode_and_copy(input_path.to_path_buf(), output_path.clone()).await?;

        let meta = ImageMeta {
            width,
            height,
            original_name: filename.to_string(),
            output_path: output_path.display().to_string(),
            output_url: format!("/static/{output_name}"),
            file_size_bytes,
        };

        // Con el umbral al 100% no hay nada que detectar: se responde un
        // informe vacío sin pasar por el proveedor.
        if conf >= 1.0 {
            let timing = Timing {
                inference_ms: 0.0,
                total_ms: elapsed_ms(started),
            };
            return Ok(enrich::empty_report(&meta, thresholds, timing));
        }

        // Al proveedor nunca se le pasa 1.0 exacto.
        let model_conf = conf.min(0.999);

        let inference_started = Instant::now();
        let raw = self
            .detector
            .detect(image, model_conf as f32, iou as f32)
            .await?;
        let inference_ms = elapsed_ms(inference_started);

        let timing = Timing {
            inference_ms,
            total_ms: elapsed_ms(started),
        };
        Ok(enrich::enrich(&raw, &meta, thresholds, timing))
    }

    /// Estado del servicio para el canal en tiempo real.
    pub fn status(&self) -> StatusPayload {
        if self.detector.ready() {
            StatusPayload {
                model_loaded: true,
                model_name: Some(MODEL_NAME.to_string()),
                total_classes: Some(CLASS_LABELS.len()),
                thresholds: Some(self.thresholds.current()),
                folders: Some(self.store.folders()),
                error: None,
            }
        } else {
            StatusPayload {
                model_loaded: false,
                model_name: None,
                total_classes: None,
                thresholds: None,
                folders: None,
                error: Some(MODEL_NOT_LOADED.to_string()),
            }
        }
    }
}

async fn decode_and_copy(input: PathBuf, output: PathBuf) -> ApiResult<(RgbImage, u32, u32)> {
    let load_error = ApiError::Provider(format!("Could not load image from {}", input.display()));
    tokio::task::spawn_blocking(move || {
        let decoded = image::open(&input).map_err(|_| load_error)?;
        decoded
            .save(&output)
            .map_err(|e| ApiError::Provider(format!("Could not write output image: {e}")))?;
        let rgb = decoded.into_rgb8();
        let (width, height) = rgb.dimensions();
        Ok((rgb, width, height))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
