/// Mapa fijo de clases del modelo: id YOLO -> etiqueta expuesta al cliente.
pub const CLASS_LABELS: [(u32, &str); 3] = [(2, "car"), (5, "bus"), (7, "truck")];

pub const MODEL_ID: &str = "custom_3class_model";
pub const MODEL_NAME: &str = "Custom YOLOv8 Model";
pub const MODEL_NOT_LOADED: &str = "Detection model is not loaded";

pub fn label_for(class_id: u32) -> Option<&'static str> {
    CLASS_LABELS
        .iter()
        .find(|(id, _)| *id == class_id)
        .map(|(_, label)| *label)
}

pub fn class_names() -> Vec<String> {
    CLASS_LABELS
        .iter()
        .map(|(_, label)| (*label).to_string())
        .collect()
}

/// Parámetros del motor YOLO aplicados en cada llamada.
#[derive(Debug, Clone, Copy)]
pub struct YoloParams {
    pub input_size: u32,        // 640 typical
    pub conf_threshold: f32,    // 0..1
    pub iou_threshold: f32,     // 0..1
    pub max_detections: usize,  // e.g. 300
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
        }
    }
}
