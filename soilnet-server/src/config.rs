use std::env;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_PORT: &str = "5001";
const DEFAULT_MODEL_PATH: &str = "models/SoilNet.onnx";
// 10 MiB, plenty for a phone photo.
const DEFAULT_BODY_LIMIT: &str = "10485760";

/// Runtime configuration, read from the environment once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub model_path: PathBuf,
    /// Maximum accepted upload size in bytes.
    pub body_limit: usize,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for: {0}")]
    InvalidValue(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let model_path = env::var("SOILNET_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
            .into();

        let body_limit = env::var("SOILNET_BODY_LIMIT")
            .unwrap_or_else(|_| DEFAULT_BODY_LIMIT.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SOILNET_BODY_LIMIT"))?;

        Ok(Config {
            port,
            model_path,
            body_limit,
        })
    }
}
