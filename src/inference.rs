use std::time::Duration;

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::config::InferenceConfig;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference service unreachable: {0}")]
    Transport(String),
    #[error("inference service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("inference response could not be decoded: {0}")]
    Decode(String),
}

/// A label photo as uploaded by the client.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub body: Bytes,
    pub content_type: String,
}

impl ImagePayload {
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            Base64::encode_string(&self.body)
        )
    }
}

/// Remote model that turns prompts (and label photos) into raw text.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn predict(&self, prompt: &str) -> Result<String, InferenceError>;
    async fn extract_from_image(
        &self,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, InferenceError>;
}

/// Client for Gradio-hosted spaces: `POST {base}/run{endpoint}` with
/// `{"data": [...]}`, answer text in `data[0]`.
#[derive(Clone)]
pub struct GradioClient {
    http: Client,
    classify_url: String,
    ocr_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    data: Vec<Value>,
}

impl GradioClient {
    pub fn new(config: &InferenceConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            classify_url: run_url(&config.classify_base_url, &config.classify_endpoint),
            ocr_url: run_url(&config.ocr_base_url, &config.ocr_endpoint),
            token: config.token.as_deref().map(normalize_token),
        })
    }

    async fn run(&self, url: &str, data: Value) -> Result<String, InferenceError> {
        let mut request = self.http.post(url).json(&json!({ "data": data }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, %url, "failed to reach inference service");
            InferenceError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let parsed: PredictResponse =
            serde_json::from_str(&body).map_err(|e| InferenceError::Decode(e.to_string()))?;
        let text = first_output(&parsed.data);
        debug!(%url, chars = text.len(), "inference response received");
        Ok(text)
    }
}

#[async_trait]
impl InferenceClient for GradioClient {
    #[instrument(skip(self, prompt))]
    async fn predict(&self, prompt: &str) -> Result<String, InferenceError> {
        self.run(&self.classify_url, json!([prompt])).await
    }

    #[instrument(skip(self, prompt, image), fields(content_type = %image.content_type, bytes = image.body.len()))]
    async fn extract_from_image(
        &self,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, InferenceError> {
        self.run(&self.ocr_url, json!([image.data_url(), prompt]))
            .await
    }
}

fn run_url(base: &str, endpoint: &str) -> String {
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/run/{}", base.trim_end_matches('/'), endpoint)
}

/// Hugging Face tokens are expected in their `hf_` form.
pub fn normalize_token(raw: &str) -> String {
    if raw.starts_with("hf_") {
        raw.to_owned()
    } else {
        format!("hf_{raw}")
    }
}

/// First output slot as text; empty when missing or falsy.
fn first_output(data: &[Value]) -> String {
    match data.first() {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | Some(Value::Bool(false)) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
