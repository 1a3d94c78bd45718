use std::path::PathBuf;

use clap::Parser;
use log::info;
use soilnet::service::{Config, Prediction, ServiceBuilder, ServiceError};

mod cli;
use cli::Args;
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error("Could not read {} -> {}", .0.display(), .1)]
    UnreadableInput(PathBuf, std::io::Error),
    #[error("Could not decode {} -> {}", .0.display(), .1)]
    CouldNotDecodeImage(PathBuf, ServiceError),
    #[error("Could not load the model -> {0}")]
    InvalidModel(ServiceError),
    #[error("Runtime failure -> {0}")]
    RuntimeFailure(ServiceError),
}

fn main() {
    if let Err(e) = exec_program() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn exec_program() -> Result<(), AppError> {
    env_logger::init();

    let args = Args::parse();
    let ranking_len = usize::from(args.show);

    info!("Input image paths: {:?}", args.input);
    info!("Model artifact: {}", args.model.display());
    info!(
        "Number of top inferred class probabilities to show: {}",
        ranking_len
    );

    let config = Config {
        num_threads: args.threads.into(),
    };
    let service = ServiceBuilder::new(args.model)
        .config(config)
        .build()
        .map_err(AppError::InvalidModel)?;

    info!("Service created successfully");

    for path in &args.input {
        let bytes =
            std::fs::read(path).map_err(|e| AppError::UnreadableInput(path.clone(), e))?;
        let output = service.infer(&bytes).map_err(|e| match e {
            e @ (ServiceError::MissingInput | ServiceError::Decode(_)) => {
                AppError::CouldNotDecodeImage(path.clone(), e)
            }
            e => AppError::RuntimeFailure(e),
        })?;

        println!("{}", path.display());
        print_ranked_predictions(output.ranked_predictions(), ranking_len);
    }

    Ok(())
}

fn print_ranked_predictions(predictions: Vec<Prediction>, k: usize) {
    for (rank, prediction) in predictions.iter().take(k).enumerate() {
        println!(
            "  {}. class: {}, confidence: {} %",
            rank + 1,
            prediction.soil_type,
            prediction.confidence
        );
    }
}
