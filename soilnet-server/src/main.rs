use std::sync::Arc;

use log::info;
use thiserror::Error;

use soilnet::service::{ServiceBuilder, ServiceError};
use soilnet_server::config::{Config, ConfigError};
use soilnet_server::routes::AppState;

#[derive(Debug, Error)]
enum AppError {
    #[error("Invalid configuration -> {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Could not load the model -> {0}")]
    ModelLoadFailure(#[from] ServiceError),
    #[error("Server failure -> {0}")]
    ServerFailure(#[from] std::io::Error),
}

fn main() {
    if let Err(e) = exec_server() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn exec_server() -> Result<(), AppError> {
    env_logger::init();

    let config = Config::from_env()?;
    info!("Loading model from {}", config.model_path.display());

    // A process that cannot load its model must not serve any traffic.
    let service = ServiceBuilder::new(config.model_path.clone()).build()?;
    info!("Service created successfully");

    let state = Arc::new(AppState { service });
    let app = soilnet_server::construct_router(state, config.body_limit);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
