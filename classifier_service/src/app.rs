use crate::config::{Config, ModelConfig};
use crate::decision::DecisionPolicy;
use crate::model_service::ModelService;
use crate::ort_service::OrtModelService;
use crate::server::{HttpServer, SharedState};
use crate::store::SqliteRecordStore;
use crate::telemetry::Metrics;

use std::{error::Error, sync::Arc};
use tokio::{signal, sync::broadcast};

/// Loads the classifier. A missing or broken model is not fatal: the service
/// starts without one and rejects predict requests.
pub fn load_model(model_config: &ModelConfig) -> Option<Arc<dyn ModelService>> {
    match OrtModelService::new(model_config) {
        Ok(service) => {
            tracing::info!("Model loaded from {:?}", model_config.get_path());
            Some(Arc::new(service))
        }
        Err(e) => {
            tracing::error!("Failed to load model, starting without one: {}", e);
            None
        }
    }
}

pub async fn start_app(config: Config) -> Result<(), Box<dyn Error>> {
    let model_service = load_model(&config.model);

    let record_store = match SqliteRecordStore::connect(&config.database).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to initialize record store: {:?}", e);
            return Err(Box::new(e));
        }
    };

    let state = SharedState {
        model_service,
        record_store,
        decision_policy: Arc::new(DecisionPolicy::new(&config.classifier)),
        metrics: Arc::new(Metrics::new()?),
    };

    tracing::info!(
        "Model status: {}",
        if state.model_loaded() { "loaded" } else { "not loaded" }
    );

    let server = HttpServer::new(state, &config.server).await?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let server_handle = server.run(shutdown_tx.subscribe()).await?;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown.");

    let _ = shutdown_tx.send(());
    match server_handle.await {
        Ok(Err(e)) => tracing::error!("Server stopped with an error: {}", e),
        Err(e) => tracing::error!("Server task failed: {}", e),
        Ok(Ok(())) => tracing::info!("Server stopped"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
