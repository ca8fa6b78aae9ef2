use async_trait::async_trait;
use ndarray::{Array, Ix4};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("session mutex poisoned: {0}")]
    Poisoned(String),
    #[error("failed to build tensor: {0}")]
    Tensor(String),
    #[error("inference failed: {0}")]
    Run(String),
    #[error("model returned no score")]
    EmptyOutput,
    #[error("model returned a non-finite score: {0}")]
    NonFinite(f32),
    #[error("inference task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A loaded binary classifier. `predict` takes a `(1, 224, 224, 3)` batch and
/// returns the probability of the positive class.
#[async_trait]
pub trait ModelService: Send + Sync + 'static {
    async fn predict(&self, input: Array<f32, Ix4>) -> Result<f32, InferenceError>;
}
