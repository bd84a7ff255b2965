use serde::{Deserialize, Serialize};

/// Detección cruda tal como la entrega el proveedor: esquinas en píxeles
/// de la imagen original, puntuación y clase del modelo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: u32,
}

impl RawDetection {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

/// Detección enriquecida lista para el cliente: centro + tamaño, posición
/// dentro de la imagen y coordenadas relativas.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
    #[serde(rename = "class")]
    pub label: String,
    pub class_id: u32,
    pub detection_id: String,
    pub area: f64,
    pub xyxy: [f64; 4],
    pub position: String,
    pub relative_position: RelativePosition,
}

/// Coordenadas normalizadas al tamaño de la imagen, en [0, 1].
#[derive(Debug, Clone, Serialize)]
pub struct RelativePosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}
