use std::sync::Arc;

use crate::application::{notify::Notifier, services::InferenceService};

/// Estado compartido para los manejadores HTTP de Axum.
/// Siguiendo la Arquitectura Hexagonal, el estado contiene los servicios (Casos de Uso).
#[derive(Clone)]
pub struct HttpState {
    /// Servicio que orquesta subida, inferencia y umbrales.
    pub inference: Arc<InferenceService>,
    /// Difusor de eventos hacia los clientes WebSocket.
    pub notifier: Notifier,
    /// Tope del cuerpo de las peticiones, en bytes.
    pub max_upload_bytes: usize,
}
