use std::sync::Arc;

use yolo_inference_server::adapters::{
    http::{router, state::HttpState},
    onnx::detector::{OfflineDetector, OnnxDetector},
    storage::MediaStore,
};
use yolo_inference_server::application::{
    notify::Notifier,
    ports::DetectorPort,
    services::{InferenceService, ThresholdStore},
};
use yolo_inference_server::config::ServerConfig;
use yolo_inference_server::domain::model::{CLASS_LABELS, MODEL_NAME};
use yolo_inference_server::domain::thresholds::Thresholds;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cfg = ServerConfig::from_env();

    tracing::info!("🔧 Inicializando adaptadores de infraestructura...");

    // 2. Instanciar Adaptadores (Capa de Infraestructura)
    let store = Arc::new(MediaStore::new(&cfg.upload_dir, &cfg.output_dir)?);

    // El modelo es opcional en el arranque: sin él, el servidor atiende
    // igualmente el resto de la API y la inferencia responde con error.
    let detector: Arc<dyn DetectorPort> = match OnnxDetector::load(&cfg.model_path) {
        Ok(detector) => {
            tracing::info!("✅ Modelo cargado: {} ({} clases)", MODEL_NAME, CLASS_LABELS.len());
            Arc::new(detector)
        }
        Err(e) => {
            tracing::warn!("❌ Error cargando el modelo '{}': {e:#}", cfg.model_path);
            tracing::warn!("⚠️  El servidor arranca, pero la inferencia no funcionará");
            Arc::new(OfflineDetector)
        }
    };

    // 3. Instanciar Servicios (Capa de Aplicación - Casos de Uso)
    let notifier = Notifier::new();
    let thresholds = ThresholdStore::new(Thresholds::default());
    let inference = Arc::new(InferenceService::new(
        detector,
        store,
        thresholds,
        notifier.clone(),
    ));

    // 4. Configurar el Estado de la API
    let state = HttpState {
        inference,
        notifier,
        max_upload_bytes: cfg.max_upload_bytes,
    };

    // 5. Configurar el Router de Axum
    let app = router(state);

    // 6. Lanzar el Servidor
    tracing::info!("🚀 Servidor de inferencia YOLO iniciado en http://{}", cfg.bind_addr);
    tracing::info!(
        "📂 Subidas en '{}', resultados servidos desde '{}'",
        cfg.upload_dir,
        cfg.output_dir
    );

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
