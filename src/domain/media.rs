use serde::Serialize;

pub const ALLOWED_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "mp4", "avi", "webp", "bmp"];

/// Directorios de trabajo tal como se anuncian en estado y salud.
#[derive(Debug, Clone, Serialize)]
pub struct Folders {
    pub upload: String,
    pub output: String,
}

/// Extensión permitida, insensible a mayúsculas. Un nombre sin punto
/// no tiene extensión y se rechaza.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// El nombre se usa como clave de búsqueda dentro del área de subida,
/// así que no puede contener separadores de ruta ni referirse al padre.
pub fn safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains('\0')
}

/// Nombre del fichero de salida derivado del de entrada:
/// `foto.jpg` -> `result_foto.jpg`.
pub fn output_name(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("result_{stem}.{ext}"),
        None => format!("result_{filename}"),
    }
}
