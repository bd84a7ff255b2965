use chrono::Local;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::detection::Prediction;

/// Informe completo de una pasada de inferencia, tal como se serializa
/// en la respuesta del endpoint y se entrega al frontend.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceReport {
    pub success: bool,
    pub timestamp: String,
    pub image_info: ImageInfo,
    pub inference_info: InferenceInfo,
    pub predictions: Vec<Prediction>,
    pub detection_summary: DetectionSummary,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub path: String,
    pub url: String,
    pub original_name: String,
    pub dimensions: Dimensions,
    /// Tamaño del fichero de entrada en KiB.
    pub file_size: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InferenceInfo {
    pub model: String,
    pub confidence_threshold: f64,
    pub iou_threshold: f64,
    /// Milisegundos dentro del proveedor.
    pub inference_time: f64,
    /// Milisegundos de la petición completa, decodificación incluida.
    pub total_processing_time: f64,
    pub model_classes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectionSummary {
    pub total_detections: usize,
    pub class_statistics: ClassCounts,
    pub confidence_stats: ConfidenceStats,
    pub detected_classes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConfidenceStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl ConfidenceStats {
    pub fn zero() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            avg: 0.0,
        }
    }
}

/// Recuento por clase que conserva el orden de primera aparición, para
/// que el resumen y el JSON enumeren las clases como fueron detectadas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCounts(Vec<(String, usize)>);

impl ClassCounts {
    pub fn increment(&mut self, label: &str) {
        match self.0.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.0.push((label.to_string(), 1)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|(label, _)| label.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ClassCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// Marca de tiempo local en formato ISO-8601 con microsegundos.
pub fn iso_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_counts_keep_first_seen_order() {
        let mut counts = ClassCounts::default();
        counts.increment("truck");
        counts.increment("car");
        counts.increment("truck");
        assert_eq!(counts.labels(), vec!["truck", "car"]);
        assert_eq!(
            serde_json::to_string(&counts).unwrap(),
            r#"{"truck":2,"car":1}"#
        );
    }

    #[test]
    fn timestamp_is_iso_like() {
        let ts = iso_timestamp();
        assert_eq!(ts.len(), 26);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], "T");
        assert_eq!(&ts[19..20], ".");
    }
}
