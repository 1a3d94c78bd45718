//! Contains the service that can be used to classify soil photographs.
//!
//! The service is created using a [`ServiceBuilder`], which loads the trained
//! artifact exactly once; a process that cannot load its model must not serve.
//!
//! Use [`Service::classify`] to turn raw image bytes into a single labeled
//! prediction, or [`Service::infer`] if you want the whole scored
//! distribution, for example to show a ranking.

mod labels;
pub mod model;
pub mod prepare;

use std::path::PathBuf;

use ndarray::Array1;
use serde::Serialize;
use thiserror::Error;

use self::model::{ScoreModel, SoilNet};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("no image was supplied")]
    MissingInput,
    #[error("the image could not be decoded: {0}")]
    Decode(#[source] image::ImageError),
    #[error("the input shape {actual:?} is different than expected {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("the output length {actual} is different than expected {expected}")]
    InvalidOutputShape { expected: usize, actual: usize },
    #[error("the model artifact could not be loaded: {0}")]
    ModelLoad(#[source] ort::Error),
    #[error("the model has no {0} tensor")]
    MissingModelIo(&'static str),
    #[error("the model failed while inferring: {0}")]
    Inference(#[source] ort::Error),
    #[error("the model session lock was poisoned")]
    PoisonedSession,
}

impl ServiceError {
    /// Whether the error was caused by the request rather than the service.
    ///
    /// Callers surface these with a 4xx-equivalent status; everything else
    /// is a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingInput | Self::Decode(_))
    }
}

/// The soil classes the model predicts, in training order.
pub fn labels() -> &'static [&'static str] {
    &labels::SOIL_LABELS
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Intra-op thread count handed to the ONNX session.
    pub num_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { num_threads: 1 }
    }
}

#[derive(Clone, Debug)]
pub struct ServiceBuilder {
    model_path: PathBuf,
    config: Config,
}

impl ServiceBuilder {
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            config: Config::default(),
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Service, ServiceError> {
        let model = SoilNet::load(&self.model_path, &self.config)?;
        Ok(Service::with_model(model))
    }
}

/// A labeled prediction with its confidence percentage.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// One of the entries of [`labels()`].
    pub soil_type: String,
    /// Percentage in [0.00, 100.00], rounded to 2 decimal places.
    pub confidence: f32,
}

impl Prediction {
    fn new(class_index: usize, probability: f32) -> Self {
        Self {
            soil_type: String::from(labels::SOIL_LABELS[class_index]),
            confidence: round_percent(probability),
        }
    }
}

/// Express a probability as a percentage rounded to 2 decimal places.
fn round_percent(probability: f32) -> f32 {
    (probability * 100.0 * 100.0).round() / 100.0
}

/// The scored distribution of a single request.
pub struct InferenceOutput {
    distribution: Array1<f32>,
}

impl InferenceOutput {
    fn new(distribution: Array1<f32>) -> Result<Self, ServiceError> {
        if distribution.len() != labels::SOIL_LABELS.len() {
            return Err(ServiceError::InvalidOutputShape {
                expected: labels::SOIL_LABELS.len(),
                actual: distribution.len(),
            });
        }
        Ok(Self { distribution })
    }

    /// The most probable class. Exact ties resolve to the lowest index.
    pub fn top_prediction(&self) -> Prediction {
        let mut class_index = 0;
        let mut best = f32::MIN;
        for (i, &probability) in self.distribution.iter().enumerate() {
            if probability > best {
                class_index = i;
                best = probability;
            }
        }
        Prediction::new(class_index, best)
    }

    /// Every class paired with its confidence, most probable first.
    /// Exact ties keep the label-set order.
    pub fn ranked_predictions(&self) -> Vec<Prediction> {
        let mut ranked: Vec<(usize, f32)> =
            self.distribution.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranked
            .into_iter()
            .map(|(class_index, probability)| Prediction::new(class_index, probability))
            .collect()
    }

    /// The raw per-class probabilities, in label-set order.
    pub fn distribution(&self) -> &Array1<f32> {
        &self.distribution
    }
}

/// The inference service: raw image bytes in, labeled prediction out.
pub struct Service<M = SoilNet> {
    model: M,
}

impl<M: ScoreModel> Service<M> {
    /// Wrap an already-loaded model.
    ///
    /// [`ServiceBuilder`] is the normal entry point; this constructor exists
    /// so callers can inject a substitute model.
    pub fn with_model(model: M) -> Self {
        Self { model }
    }

    /// Classify a soil photograph supplied as raw encoded bytes.
    pub fn classify(&self, image_bytes: &[u8]) -> Result<Prediction, ServiceError> {
        Ok(self.infer(image_bytes)?.top_prediction())
    }

    /// Run the pipeline and keep the full distribution, for callers that
    /// want the per-class breakdown.
    ///
    /// The decoded image is an intermediate: it is dropped as soon as the
    /// tensor is built, on every exit path.
    pub fn infer(&self, image_bytes: &[u8]) -> Result<InferenceOutput, ServiceError> {
        if image_bytes.is_empty() {
            return Err(ServiceError::MissingInput);
        }

        let tensor = {
            let image = image::load_from_memory(image_bytes).map_err(ServiceError::Decode)?;
            prepare::preprocessing(&image)
        };

        if log::log_enabled!(log::Level::Debug) {
            let min = tensor.fold(f32::INFINITY, |acc, &v| acc.min(v));
            let max = tensor.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
            log::debug!(
                "input tensor shape {:?}, min {:.4}, max {:.4}, mean {:.4}",
                tensor.shape(),
                min,
                max,
                tensor.mean().unwrap_or(0.0)
            );
        }

        let distribution = self.model.score(&tensor)?;
        let output = InferenceOutput::new(distribution)?;

        if log::log_enabled!(log::Level::Debug) {
            for prediction in output.ranked_predictions() {
                log::debug!("{}: {:.2}%", prediction.soil_type, prediction.confidence);
            }
        }

        Ok(output)
    }
}
