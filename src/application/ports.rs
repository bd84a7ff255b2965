use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{detection::RawDetection, errors::ApiResult};

/// Puerto del proveedor de detección. El servicio lo trata como caja
/// negra: entra una imagen decodificada con los umbrales vigentes y
/// salen detecciones crudas en píxeles de esa imagen.
#[async_trait]
pub trait DetectorPort: Send + Sync {
    async fn detect(&self, image: RgbImage, conf: f32, iou: f32) -> ApiResult<Vec<RawDetection>>;

    /// Si el proveedor puede atender peticiones ahora mismo.
    fn ready(&self) -> bool;
}
