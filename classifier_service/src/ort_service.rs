use crate::{
    config::ModelConfig,
    model_service::{InferenceError, ModelService},
};
use async_trait::async_trait;
use ndarray::{Array, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

#[derive(Clone)]
pub struct OrtModelService {
    sessions: Arc<Vec<Arc<Mutex<Session>>>>,
    counter: Arc<AtomicUsize>,
}

impl OrtModelService {
    pub fn new(model_config: &ModelConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let model_path = model_config.get_path();
        if !model_path.exists() {
            return Err(format!("Model file not found: {:?}", model_path).into());
        }

        let num_instances = model_config.num_instances.max(1);
        let sessions = (0..num_instances)
            .map(|_| {
                let session = Session::builder()?
                    .with_optimization_level(GraphOptimizationLevel::Level3)?
                    .commit_from_file(&model_path)?;
                Ok(Arc::new(Mutex::new(session)))
            })
            .collect::<Result<Vec<_>, ort::Error>>()?;

        tracing::info!(
            "Created {} ONNX sessions from {:?}",
            num_instances,
            model_path
        );

        Ok(Self {
            counter: Arc::new(AtomicUsize::new(0)),
            sessions: Arc::new(sessions),
        })
    }

    /// Runs one forward pass on the next session of the pool and returns the
    /// first value of the first output.
    pub fn run_inference(&self, input: &Array<f32, Ix4>) -> Result<f32, InferenceError> {
        let index = self.counter.fetch_add(1, Ordering::SeqCst) % self.sessions.len();
        let session_arc = &self.sessions[index];
        let mut session = session_arc
            .lock()
            .map_err(|e| InferenceError::Poisoned(e.to_string()))?;

        tracing::debug!("Handling request with session {}", index);
        let owned_buffer;
        let input_view = if input.view().is_standard_layout() {
            input.view()
        } else {
            owned_buffer = input.as_standard_layout().to_owned();
            owned_buffer.view()
        };

        let tensor_ref = TensorRef::from_array_view(input_view)
            .map_err(|e| InferenceError::Tensor(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![tensor_ref])
            .map_err(|e| InferenceError::Run(e.to_string()))?;

        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Run(e.to_string()))?;

        let score = *data.first().ok_or(InferenceError::EmptyOutput)?;
        if !score.is_finite() {
            return Err(InferenceError::NonFinite(score));
        }

        Ok(score.clamp(0.0, 1.0))
    }
}

#[async_trait]
impl ModelService for OrtModelService {
    async fn predict(&self, input: Array<f32, Ix4>) -> Result<f32, InferenceError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.run_inference(&input)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_model_file_is_an_error() {
        let config = ModelConfig {
            onnx_file: "does-not-exist.onnx".into(),
            model_dir: PathBuf::from("./no-such-dir"),
            num_instances: 1,
        };

        let result = OrtModelService::new(&config);
        assert!(result.is_err());
        assert!(result
            .err()
            .map(|e| e.to_string().contains("Model file not found"))
            .unwrap_or(false));
    }
}
