use std::path::{Path, PathBuf};

use crate::domain::errors::{ApiError, ApiResult};
use crate::domain::media::Folders;

/// Áreas de ficheros en disco: las subidas de los clientes y las copias
/// de salida que se sirven como resultado.
pub struct MediaStore {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl MediaStore {
    /// Crea ambos directorios si no existen todavía.
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> std::io::Result<Self> {
        let upload_dir = upload_dir.into();
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&upload_dir)?;
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            upload_dir,
            output_dir,
        })
    }

    pub fn upload_path(&self, filename: &str) -> PathBuf {
        self.upload_dir.join(filename)
    }

    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn folders(&self) -> Folders {
        Folders {
            upload: self.upload_dir.display().to_string(),
            output: self.output_dir.display().to_string(),
        }
    }

    /// Guarda el contenido subido bajo su nombre original y devuelve el
    /// tamaño escrito en bytes.
    pub async fn save_upload(&self, filename: &str, bytes: &[u8]) -> ApiResult<u64> {
        let path = self.upload_path(filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ApiError::Internal(format!("Upload error: {e}")))?;
        Ok(bytes.len() as u64)
    }
}
