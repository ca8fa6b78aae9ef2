use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use classifier_service::{
    config::{ClassifierConfig, ModelConfig},
    decision::DecisionPolicy,
    ort_service::OrtModelService,
};
use dataset_tools::{
    dataset::Dataset,
    evaluate::evaluate,
    preprocess::resize_dataset,
    report::ClassificationReport,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dataset-tools", about = "Offline helpers for the image classifier")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a confusion matrix and classification report for a labelled test set
    Evaluate {
        /// ONNX model file
        #[arg(long)]
        model: PathBuf,
        /// Dataset root with one subdirectory per class
        #[arg(long)]
        data: PathBuf,
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,
    },
    /// Resize every image of a labelled dataset in place
    Preprocess {
        #[arg(long)]
        data: PathBuf,
        #[arg(long, default_value_t = 224)]
        size: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ort=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            model,
            data,
            threshold,
        } => run_evaluate(model, data, threshold).await,
        Commands::Preprocess { data, size } => run_preprocess(data, size),
    }
}

async fn run_evaluate(model: PathBuf, data: PathBuf, threshold: f64) -> Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&threshold),
        "threshold must be within [0, 1]"
    );

    let dataset = Dataset::scan(&data)?;
    dataset.require_classes(2)?;

    let model_config = ModelConfig {
        onnx_file: model
            .file_name()
            .context("model path has no file name")?
            .to_string_lossy()
            .into_owned(),
        model_dir: model.parent().map(PathBuf::from).unwrap_or_default(),
        num_instances: 1,
    };
    let model_service = OrtModelService::new(&model_config)
        .map_err(|e| anyhow::anyhow!("failed to load model {:?}: {}", model, e))?;

    let policy = DecisionPolicy::new(&ClassifierConfig {
        threshold,
        ..ClassifierConfig::default()
    });

    let evaluation = evaluate(&model_service, &dataset, &policy).await;
    if !evaluation.skipped.is_empty() {
        tracing::warn!("{} images were skipped", evaluation.skipped.len());
    }

    println!("Classes: {:?}", dataset.class_names);
    println!("{}", evaluation.matrix);
    println!();
    println!(
        "{}",
        ClassificationReport {
            matrix: &evaluation.matrix,
            class_names: &dataset.class_names,
        }
    );

    Ok(())
}

fn run_preprocess(data: PathBuf, size: u32) -> Result<()> {
    anyhow::ensure!(size > 0, "size must be greater than zero");

    let dataset = Dataset::scan(&data)?;
    let summary = resize_dataset(&dataset, size);

    println!(
        "Resized {} images to {}x{} ({} failed)",
        summary.processed, size, size, summary.failed
    );

    Ok(())
}
