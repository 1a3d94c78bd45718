use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use ndarray::{Array1, Array4};
use serde_json::Value;
use tower::ServiceExt;

use soilnet::service::model::ScoreModel;
use soilnet::service::{Service, ServiceError};
use soilnet_server::construct_router;
use soilnet_server::routes::AppState;

const BOUNDARY: &str = "soilnet-test-boundary";

struct ScriptedModel(Vec<f32>);

impl ScoreModel for ScriptedModel {
    fn score(&self, _input: &Array4<f32>) -> Result<Array1<f32>, ServiceError> {
        Ok(Array1::from_vec(self.0.clone()))
    }
}

struct FailingModel;

impl ScoreModel for FailingModel {
    fn score(&self, _input: &Array4<f32>) -> Result<Array1<f32>, ServiceError> {
        Err(ServiceError::PoisonedSession)
    }
}

fn test_app<M>(model: M) -> axum::Router
where
    M: ScoreModel + Send + Sync + 'static,
{
    let state = Arc::new(AppState {
        service: Service::with_model(model),
    });
    construct_router(state, 1024 * 1024)
}

fn soil_photo_jpeg() -> Vec<u8> {
    let image = RgbImage::from_fn(160, 120, |x, y| {
        image::Rgb([(50 + x % 32) as u8, (35 + y % 16) as u8, 25])
    });

    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new(Cursor::new(&mut bytes));
    encoder
        .encode(image.as_raw(), 160, 120, image::ColorType::Rgb8)
        .unwrap();
    bytes
}

fn multipart_body(field: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"soil.jpg\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn predict_request(field: &str, bytes: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict-soil")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, bytes)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn predicts_the_most_probable_soil_type() {
    let app = test_app(ScriptedModel(vec![0.05, 0.90, 0.03, 0.02]));

    let response = app
        .oneshot(predict_request("image", &soil_photo_jpeg()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["soilType"], "Black Soil");
    assert_eq!(json["confidence"], 90.0);
}

#[tokio::test]
async fn ties_resolve_to_the_first_label() {
    let app = test_app(ScriptedModel(vec![0.30, 0.30, 0.20, 0.20]));

    let response = app
        .oneshot(predict_request("image", &soil_photo_jpeg()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["soilType"], "Alluvial Soil");
    assert_eq!(json["confidence"], 30.0);
}

#[tokio::test]
async fn upload_without_an_image_field_is_rejected() {
    let app = test_app(ScriptedModel(vec![0.25; 4]));

    let response = app
        .oneshot(predict_request("attachment", &soil_photo_jpeg()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "No image uploaded");
}

#[tokio::test]
async fn empty_image_field_is_rejected() {
    let app = test_app(ScriptedModel(vec![0.25; 4]));

    let response = app
        .oneshot(predict_request("image", &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "No image uploaded");
}

#[tokio::test]
async fn undecodable_upload_is_a_client_error() {
    let app = test_app(ScriptedModel(vec![0.25; 4]));

    let response = app
        .oneshot(predict_request("image", b"definitely not an image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("decoded"));
}

#[tokio::test]
async fn model_failures_stay_generic_on_the_wire() {
    let app = test_app(FailingModel);

    let response = app
        .oneshot(predict_request("image", &soil_photo_jpeg()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Inference failed");
}

#[tokio::test]
async fn health_answers_ok() {
    let app = test_app(ScriptedModel(vec![0.25; 4]));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "OK");
}
