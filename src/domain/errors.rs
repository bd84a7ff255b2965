use thiserror::Error;

/// Errores de la API. El mensaje viaja tal cual al cliente en el cuerpo
/// `{"success": false, "error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    /// El proveedor de detección falló o la imagen no se pudo procesar.
    #[error("{0}")]
    Provider(String),
    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
