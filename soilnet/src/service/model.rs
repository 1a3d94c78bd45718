use std::path::Path;
use std::sync::Mutex;

use ndarray::{Array1, Array4};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use super::prepare::{TARGET_HEIGHT, TARGET_WIDTH};
use super::{Config, ServiceError};

/// Scoring seam of the inference pipeline.
///
/// The trained model is a black-box function from a normalized tensor to a
/// probability distribution over the soil classes. Tests substitute this
/// with a scripted double.
pub trait ScoreModel {
    /// Run the forward pass on a single-image batch.
    ///
    /// The input must have shape `[1, 150, 150, 3]`. The output carries one
    /// probability per class, in label-set order.
    fn score(&self, input: &Array4<f32>) -> Result<Array1<f32>, ServiceError>;
}

/// The trained SoilNet classifier, hosted through ONNX Runtime.
///
/// The artifact is loaded exactly once and owned for the lifetime of the
/// process. `Session::run` needs exclusive access, so scoring is serialized
/// through a single execution slot; throughput is one in-flight forward pass
/// at a time.
pub struct SoilNet {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl SoilNet {
    /// Load the ONNX artifact from `path`.
    ///
    /// The input and output tensor names are discovered from the session
    /// metadata rather than hardcoded; exports name their layers freely.
    pub fn load(path: &Path, config: &Config) -> Result<Self, ServiceError> {
        let session = build_session(path, config).map_err(ServiceError::ModelLoad)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or(ServiceError::MissingModelIo("input"))?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or(ServiceError::MissingModelIo("output"))?;

        log::info!(
            "loaded model from {} (input {:?}, output {:?})",
            path.display(),
            input_name,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

fn build_session(path: &Path, config: &Config) -> Result<Session, ort::Error> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(config.num_threads)?
        .commit_from_file(path)
}

impl ScoreModel for SoilNet {
    fn score(&self, input: &Array4<f32>) -> Result<Array1<f32>, ServiceError> {
        let expected = [1, TARGET_HEIGHT as usize, TARGET_WIDTH as usize, 3];
        if input.shape() != expected {
            return Err(ServiceError::ShapeMismatch {
                expected: expected.to_vec(),
                actual: input.shape().to_vec(),
            });
        }

        let dims: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let contiguous = input.as_standard_layout();
        let data = contiguous
            .as_slice()
            .expect("a standard-layout array has a contiguous slice");

        let mut session = self
            .session
            .lock()
            .map_err(|_| ServiceError::PoisonedSession)?;

        let input_tensor =
            TensorRef::from_array_view((dims, data)).map_err(ServiceError::Inference)?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(ServiceError::Inference)?;

        let (shape, probabilities) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(ServiceError::Inference)?;
        log::debug!("model output shape {:?}", shape);

        Ok(Array1::from_vec(probabilities.to_vec()))
    }
}
