use std::sync::Arc;

use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;
use zimage_core::{Handler, JobOutput, Loader};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Completed,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct JobResult {
    pub id: Uuid,
    pub status: JobStatus,
    pub output: JobOutput,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub model_loaded: bool,
}

pub fn router<L: Loader + 'static>(handler: Arc<Handler<L>>) -> Router {
    Router::new()
        .route("/runsync", post(run_sync::<L>))
        .route("/health", get(health::<L>))
        .with_state(handler)
}

async fn run_sync<L: Loader + 'static>(
    State(handler): State<Arc<Handler<L>>>,
    Json(event): Json<Value>,
) -> Json<JobResult> {
    let id = Uuid::new_v4();
    let output = handler
        .handle(&event)
        .instrument(tracing::info_span!("job", %id))
        .await;
    Json(JobResult {
        id,
        status: JobStatus::Completed,
        output,
    })
}

async fn health<L: Loader + 'static>(State(handler): State<Arc<Handler<L>>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: handler.variant().to_string(),
        model_loaded: handler.is_model_loaded(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use base64::{prelude::BASE64_STANDARD, Engine};
    use image::{GenericImageView, ImageFormat};
    use serde_json::json;
    use tower::ServiceExt;
    use zimage_core::{DeviceMap, ModelVariant, PlaceholderLoader};

    fn app() -> (Router, Arc<Handler<PlaceholderLoader>>) {
        let handler = Arc::new(Handler::new(
            PlaceholderLoader,
            ModelVariant::ZImageTurbo,
            DeviceMap::ForceCpu,
        ));
        (router(handler.clone()), handler)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/runsync")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_runsync_returns_images() {
        let (app, _) = app();
        let event = json!({
            "input": { "prompt": "cat", "width": 64, "height": 64, "num_images": 2, "seed": 7 }
        });

        let (status, body) = send(app, post_json(event)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "COMPLETED");
        assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());

        let images = body["output"]["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        for encoded in images {
            let bytes = BASE64_STANDARD.decode(encoded.as_str().unwrap()).unwrap();
            let img = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
            assert_eq!(img.dimensions(), (64, 64));
        }
    }

    #[tokio::test]
    async fn test_runsync_reports_missing_prompt() {
        let (app, handler) = app();

        let (status, body) = send(app, post_json(json!({ "input": {} }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output"], json!({ "error": "prompt is required" }));
        assert!(!handler.is_model_loaded());
    }

    #[tokio::test]
    async fn test_runsync_rejects_non_json() {
        let (app, _) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/runsync")
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .unwrap();

        let (status, _) = send(app, request).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_health_tracks_cold_start() {
        let (app, _) = app();
        let health = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app.clone(), health).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "z-image-turbo");
        assert_eq!(body["model_loaded"], false);

        let event = json!({ "input": { "prompt": "cat", "width": 8, "height": 8 } });
        send(app.clone(), post_json(event)).await;

        let health = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (_, body) = send(app, health).await;
        assert_eq!(body["model_loaded"], true);
    }
}
