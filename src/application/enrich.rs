use tracing::warn;
use uuid::Uuid;

use crate::domain::detection::{Prediction, RawDetection, RelativePosition};
use crate::domain::model::{label_for, CLASS_LABELS, MODEL_ID};
use crate::domain::report::{
    iso_timestamp, ClassCounts, ConfidenceStats, DetectionSummary, Dimensions, ImageInfo,
    InferenceInfo, InferenceReport,
};
use crate::domain::thresholds::Thresholds;

/// Metadatos de la imagen procesada que el informe necesita.
#[derive(Debug, Clone)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    pub original_name: String,
    pub output_path: String,
    pub output_url: String,
    pub file_size_bytes: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub inference_ms: f64,
    pub total_ms: f64,
}

/// Convierte las detecciones crudas del proveedor en el informe final:
/// centro + tamaño, posición en la imagen, estadísticas por clase y
/// resumen legible. Las clases fuera del mapa del modelo se descartan,
/// igual que cualquier puntuación por debajo del umbral pedido.
pub fn enrich(
    raw: &[RawDetection],
    meta: &ImageMeta,
    thresholds: Thresholds,
    timing: Timing,
) -> InferenceReport {
    let img_w = meta.width as f64;
    let img_h = meta.height as f64;

    let mut predictions = Vec::new();
    let mut counts = ClassCounts::default();
    let mut scores: Vec<f64> = Vec::new();

    for det in raw {
        let Some(label) = label_for(det.class_id) else {
            warn!("Clase desconocida {} en la salida del modelo, se descarta", det.class_id);
            continue;
        };
        let score = det.score as f64;
        if score < thresholds.confidence {
            continue;
        }

        let width = det.width() as f64;
        let height = det.height() as f64;
        let center_x = det.x1 as f64 + width / 2.0;
        let center_y = det.y1 as f64 + height / 2.0;

        predictions.push(Prediction {
            x: round_to(center_x, 1),
            y: round_to(center_y, 1),
            width: round_to(width, 1),
            height: round_to(height, 1),
            confidence: round_to(score, 3),
            label: label.to_string(),
            class_id: det.class_id,
            detection_id: Uuid::new_v4().to_string(),
            area: round_to(width * height, 1),
            xyxy: [
                round_to(det.x1 as f64, 1),
                round_to(det.y1 as f64, 1),
                round_to(det.x2 as f64, 1),
                round_to(det.y2 as f64, 1),
            ],
            position: position_label(center_x, center_y, img_w, img_h),
            relative_position: RelativePosition {
                x: round_to(center_x / img_w, 4),
                y: round_to(center_y / img_h, 4),
                width: round_to(width / img_w, 4),
                height: round_to(height / img_h, 4),
            },
        });
        counts.increment(label);
        scores.push(score);
    }

    let confidence_stats = if scores.is_empty() {
        ConfidenceStats::zero()
    } else {
        let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let avg = scores.iter().sum::<f64>() / scores.len() as f64;
        ConfidenceStats {
            min: round_to(min, 3),
            max: round_to(max, 3),
            avg: round_to(avg, 3),
        }
    };

    let summary = summary_sentence(&counts, predictions.len());

    InferenceReport {
        success: true,
        timestamp: iso_timestamp(),
        image_info: ImageInfo {
            path: meta.output_path.clone(),
            url: meta.output_url.clone(),
            original_name: meta.original_name.clone(),
            dimensions: Dimensions {
                width: meta.width,
                height: meta.height,
                aspect_ratio: round_to(img_w / img_h, 2),
            },
            file_size: round_to(meta.file_size_bytes as f64 / 1024.0, 2),
        },
        inference_info: InferenceInfo {
            model: MODEL_ID.to_string(),
            confidence_threshold: thresholds.confidence,
            iou_threshold: thresholds.iou,
            inference_time: round_to(timing.inference_ms, 2),
            total_processing_time: round_to(timing.total_ms, 2),
            model_classes: CLASS_LABELS.len(),
        },
        detection_summary: DetectionSummary {
            total_detections: predictions.len(),
            class_statistics: counts.clone(),
            confidence_stats,
            detected_classes: counts.labels(),
        },
        predictions,
        summary,
    }
}

/// Informe válido y vacío para el caso umbral de confianza 1.0, en el
/// que el proveedor ni siquiera se invoca.
pub fn empty_report(meta: &ImageMeta, thresholds: Thresholds, timing: Timing) -> InferenceReport {
    let mut report = enrich(&[], meta, thresholds, timing);
    report.summary = "No objects detected in the image (confidence threshold: 100%).".to_string();
    report
}

/// Posición del centro del objeto en una rejilla de 3x3 con cortes en
/// el 33% y el 67% de cada eje: "top-left", "middle-center", etc.
fn position_label(center_x: f64, center_y: f64, img_w: f64, img_h: f64) -> String {
    let horizontal = if center_x < img_w * 0.33 {
        "left"
    } else if center_x < img_w * 0.67 {
        "center"
    } else {
        "right"
    };
    let vertical = if center_y < img_h * 0.33 {
        "top"
    } else if center_y < img_h * 0.67 {
        "middle"
    } else {
        "bottom"
    };
    format!("{vertical}-{horizontal}")
}

fn pluralize(label: &str, count: usize) -> String {
    if count == 1 {
        return format!("1 {label}");
    }
    let suffix = if ["s", "x", "ch", "sh"].iter().any(|end| label.ends_with(end)) {
        "es"
    } else {
        "s"
    };
    format!("{count} {label}{suffix}")
}

/// Frase de resumen con los recuentos en orden de primera aparición y
/// coma de Oxford a partir de tres clases.
fn summary_sentence(counts: &ClassCounts, total: usize) -> String {
    if total == 0 {
        return "No objects detected in the image.".to_string();
    }
    let parts: Vec<String> = counts
        .iter()
        .map(|(label, count)| pluralize(label, count))
        .collect();
    match parts.as_slice() {
        [single] => format!("Detected {single} in the image."),
        [first, second] => format!("Detected {first} and {second} in the image."),
        _ => {
            let head = parts[..parts.len() - 1].join(", ");
            format!("Detected {}, and {} in the image.", head, parts[parts.len() - 1])
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: u32) -> RawDetection {
        RawDetection {
            x1,
            y1,
            x2,
            y2,
            score,
            class_id,
        }
    }

    fn meta_640x480() -> ImageMeta {
        ImageMeta {
            width: 640,
            height: 480,
            original_name: "photo.jpg".into(),
            output_path: "static/result_photo.jpg".into(),
            output_url: "/static/result_photo.jpg".into(),
            file_size_bytes: 2048,
        }
    }

    fn timing() -> Timing {
        Timing {
            inference_ms: 12.345,
            total_ms: 40.678,
        }
    }

    #[test]
    fn converts_corners_to_center_and_size() {
        let raw = [det(100.0, 50.0, 300.0, 250.0, 0.87, 2)];
        let report = enrich(&raw, &meta_640x480(), Thresholds::default(), timing());

        let p = &report.predictions[0];
        assert_eq!(p.x, 200.0);
        assert_eq!(p.y, 150.0);
        assert_eq!(p.width, 200.0);
        assert_eq!(p.height, 200.0);
        assert_eq!(p.confidence, 0.87);
        assert_eq!(p.label, "car");
        assert_eq!(p.class_id, 2);
        assert_eq!(p.area, 40000.0);
        assert_eq!(p.xyxy, [100.0, 50.0, 300.0, 250.0]);
        assert_eq!(p.relative_position.x, 0.3125);
        assert_eq!(p.relative_position.y, 0.3125);
        assert_eq!(p.relative_position.width, 0.3125);
        assert_eq!(p.relative_position.height, 0.4167);
    }

    #[test]
    fn every_prediction_respects_requested_threshold() {
        let raw = [
            det(0.0, 0.0, 10.0, 10.0, 0.95, 2),
            det(0.0, 0.0, 10.0, 10.0, 0.50, 5),
            det(0.0, 0.0, 10.0, 10.0, 0.49, 7),
        ];
        let thresholds = Thresholds {
            confidence: 0.5,
            iou: 0.5,
        };
        let report = enrich(&raw, &meta_640x480(), thresholds, timing());

        assert_eq!(report.detection_summary.total_detections, 2);
        assert!(report
            .predictions
            .iter()
            .all(|p| p.confidence >= thresholds.confidence));
    }

    #[test]
    fn drops_classes_outside_model_map() {
        let raw = [
            det(0.0, 0.0, 10.0, 10.0, 0.9, 3),
            det(0.0, 0.0, 10.0, 10.0, 0.9, 5),
        ];
        let report = enrich(&raw, &meta_640x480(), Thresholds::default(), timing());

        assert_eq!(report.predictions.len(), 1);
        assert_eq!(report.predictions[0].label, "bus");
    }

    #[test]
    fn position_grid_corners_and_center() {
        let meta = meta_640x480();
        let thresholds = Thresholds::default();
        // centro en (50, 50): primer tercio de ambos ejes
        let top_left = enrich(&[det(0.0, 0.0, 100.0, 100.0, 0.9, 2)], &meta, thresholds, timing());
        assert_eq!(top_left.predictions[0].position, "top-left");
        // centro en (320, 240): exactamente el medio
        let center = enrich(
            &[det(270.0, 190.0, 370.0, 290.0, 0.9, 2)],
            &meta,
            thresholds,
            timing(),
        );
        assert_eq!(center.predictions[0].position, "middle-center");
        // centro en (600, 460): último tercio de ambos ejes
        let bottom_right = enrich(
            &[det(550.0, 410.0, 650.0, 510.0, 0.9, 2)],
            &meta,
            thresholds,
            timing(),
        );
        assert_eq!(bottom_right.predictions[0].position, "bottom-right");
    }

    #[test]
    fn pluralizes_regular_and_sibilant_names() {
        assert_eq!(pluralize("car", 1), "1 car");
        assert_eq!(pluralize("car", 3), "3 cars");
        assert_eq!(pluralize("bus", 2), "2 buses");
        assert_eq!(pluralize("truck", 2), "2 trucks");
    }

    #[test]
    fn summary_single_pair_and_oxford_comma() {
        let raw_one = [det(0.0, 0.0, 10.0, 10.0, 0.9, 2)];
        let one = enrich(&raw_one, &meta_640x480(), Thresholds::default(), timing());
        assert_eq!(one.summary, "Detected 1 car in the image.");

        let raw_two = [
            det(0.0, 0.0, 10.0, 10.0, 0.9, 2),
            det(20.0, 0.0, 30.0, 10.0, 0.9, 2),
            det(40.0, 0.0, 50.0, 10.0, 0.8, 5),
        ];
        let two = enrich(&raw_two, &meta_640x480(), Thresholds::default(), timing());
        assert_eq!(two.summary, "Detected 2 cars and 1 bus in the image.");

        let raw_three = [
            det(0.0, 0.0, 10.0, 10.0, 0.9, 7),
            det(20.0, 0.0, 30.0, 10.0, 0.9, 2),
            det(40.0, 0.0, 50.0, 10.0, 0.8, 5),
            det(60.0, 0.0, 70.0, 10.0, 0.8, 5),
        ];
        let three = enrich(&raw_three, &meta_640x480(), Thresholds::default(), timing());
        assert_eq!(
            three.summary,
            "Detected 1 truck, 1 car, and 2 buses in the image."
        );
    }

    #[test]
    fn statistics_match_survivors() {
        let raw = [
            det(0.0, 0.0, 10.0, 10.0, 0.9, 2),
            det(20.0, 0.0, 30.0, 10.0, 0.6, 5),
            det(40.0, 0.0, 50.0, 10.0, 0.3, 7),
        ];
        let report = enrich(&raw, &meta_640x480(), Thresholds::default(), timing());

        let stats = &report.detection_summary.confidence_stats;
        assert_eq!(stats.min, 0.3);
        assert_eq!(stats.max, 0.9);
        assert_eq!(stats.avg, 0.6);
        assert_eq!(
            report.detection_summary.detected_classes,
            vec!["car", "bus", "truck"]
        );
    }

    #[test]
    fn empty_input_yields_zeroed_summary() {
        let report = enrich(&[], &meta_640x480(), Thresholds::default(), timing());

        assert!(report.success);
        assert_eq!(report.detection_summary.total_detections, 0);
        assert!(report.detection_summary.class_statistics.is_empty());
        assert_eq!(report.detection_summary.confidence_stats.min, 0.0);
        assert_eq!(report.summary, "No objects detected in the image.");
        assert_eq!(report.image_info.file_size, 2.0);
        assert_eq!(report.image_info.dimensions.aspect_ratio, 1.33);
    }

    #[test]
    fn full_threshold_report_notes_the_cause() {
        let report = empty_report(
            &meta_640x480(),
            Thresholds {
                confidence: 1.0,
                iou: 0.5,
            },
            Timing {
                inference_ms: 0.0,
                total_ms: 5.0,
            },
        );

        assert!(report.predictions.is_empty());
        assert_eq!(report.inference_info.inference_time, 0.0);
        assert_eq!(report.inference_info.confidence_threshold, 1.0);
        assert_eq!(
            report.summary,
            "No objects detected in the image (confidence threshold: 100%)."
        );
    }

    #[test]
    fn identical_input_yields_identical_geometry() {
        let raw = [
            det(10.0, 20.0, 110.0, 220.0, 0.77, 2),
            det(300.0, 100.0, 400.0, 200.0, 0.55, 7),
        ];
        let a = enrich(&raw, &meta_640x480(), Thresholds::default(), timing());
        let b = enrich(&raw, &meta_640x480(), Thresholds::default(), timing());

        for (pa, pb) in a.predictions.iter().zip(b.predictions.iter()) {
            assert_eq!(pa.xyxy, pb.xyxy);
            assert_eq!(pa.position, pb.position);
            assert_eq!(pa.confidence, pb.confidence);
            // el identificador es lo único que cambia entre pasadas
            assert_ne!(pa.detection_id, pb.detection_id);
        }
        assert_eq!(a.summary, b.summary);
    }
}
