use std::env;

pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Configuración del servidor, leída del entorno con los valores del
/// despliegue de referencia como defecto.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub upload_dir: String,
    pub output_dir: String,
    pub model_path: String,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            upload_dir: "uploads".to_string(),
            output_dir: "static".to_string(),
            model_path: "models/yolov8n.onnx".to_string(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_or("BIND_ADDR", defaults.bind_addr),
            upload_dir: env_or("UPLOAD_DIR", defaults.upload_dir),
            output_dir: env_or("OUTPUT_DIR", defaults.output_dir),
            model_path: env_or("MODEL_PATH", defaults.model_path),
            max_upload_bytes: defaults.max_upload_bytes,
        }
    }
}

fn env_or(key: &str, fallback: String) -> String {
    env::var(key).unwrap_or(fallback)
}
