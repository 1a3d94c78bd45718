use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};

use soilnet::service::model::ScoreModel;
use soilnet::service::{Prediction, Service};

use crate::error::ApiError;

/// Shared per-process state: the inference service with its loaded model.
pub struct AppState<M> {
    pub service: Service<M>,
}

/// `POST /predict-soil`: classify one uploaded soil photograph.
///
/// The upload is a multipart form with the image bytes in a field named
/// `image`; any other fields are ignored. Scoring is CPU-bound and gated by
/// the model's session lock; it runs on a blocking thread, off the async
/// executor.
pub async fn predict_soil<M>(
    State(state): State<Arc<AppState<M>>>,
    mut multipart: Multipart,
) -> Result<Json<Prediction>, ApiError>
where
    M: ScoreModel + Send + Sync + 'static,
{
    let mut image_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.to_string()))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ApiError::bad_request(err.to_string()))?;
            image_bytes = Some(bytes);
            break;
        }
    }

    let image_bytes = image_bytes.ok_or_else(|| ApiError::bad_request("No image uploaded"))?;

    let prediction = tokio::task::spawn_blocking(move || {
        state.service.classify(&image_bytes)
    })
    .await
    .map_err(|err| {
        log::error!("inference task failed to join: {err}");
        ApiError::internal()
    })??;

    log::info!(
        "predicted {} at {:.2}%",
        prediction.soil_type,
        prediction.confidence
    );

    Ok(Json(prediction))
}

/// `GET /health`: liveness probe. The router is only built after the model
/// loaded, so an OK here means the process can serve.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
