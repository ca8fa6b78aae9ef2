use crate::{dataset::Dataset, report::ConfusionMatrix};
use classifier_service::{
    decision::{DecisionPolicy, Label},
    model_service::ModelService,
    normalizer::normalize,
};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct Evaluation {
    pub matrix: ConfusionMatrix,
    pub skipped: Vec<PathBuf>,
}

/// Scores every image of a two-class dataset and tallies the results against
/// the directory labels. Images that cannot be read, decoded or scored are
/// logged and skipped.
pub async fn evaluate(
    model_service: &dyn ModelService,
    dataset: &Dataset,
    policy: &DecisionPolicy,
) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for (i, image) in dataset.images.iter().enumerate() {
        let input = match std::fs::read(&image.path)
            .map_err(|e| e.to_string())
            .and_then(|data| normalize(&data).map_err(|e| e.to_string()))
        {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", image.path, e);
                evaluation.skipped.push(image.path.clone());
                continue;
            }
        };

        let score = match model_service.predict(input).await {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!("Inference failed for {:?}: {}", image.path, e);
                evaluation.skipped.push(image.path.clone());
                continue;
            }
        };

        let predicted = match policy.decide(f64::from(score)).label {
            Label::Positive => 1,
            Label::Negative => 0,
        };
        evaluation.matrix.record(image.class_index, predicted);

        if (i + 1) % 100 == 0 {
            tracing::info!("Evaluated {}/{} images", i + 1, dataset.images.len());
        }
    }

    evaluation
}
