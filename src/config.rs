use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    pub classify_base_url: String,
    pub classify_endpoint: String,
    pub ocr_base_url: String,
    pub ocr_endpoint: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub minio_endpoint: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub inference: InferenceConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "diasense".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "diasense-users".into()),
        };

        let classify_base_url = std::env::var("INFERENCE_BASE_URL")?;
        let inference = InferenceConfig {
            ocr_base_url: std::env::var("INFERENCE_OCR_BASE_URL")
                .unwrap_or_else(|_| classify_base_url.clone()),
            classify_base_url,
            classify_endpoint: std::env::var("INFERENCE_CLASSIFY_ENDPOINT")
                .unwrap_or_else(|_| "/predict".into()),
            ocr_endpoint: std::env::var("INFERENCE_OCR_ENDPOINT")
                .unwrap_or_else(|_| "/extract_nutrition_label".into()),
            token: std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty()),
            timeout_secs: std::env::var("INFERENCE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60),
        };

        Ok(Self {
            database_url,
            jwt,
            minio_endpoint: std::env::var("MINIO_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".into()),
            minio_bucket: std::env::var("MINIO_BUCKET").unwrap_or_else(|_| "scans".into()),
            minio_access_key: std::env::var("MINIO_ACCESS_KEY")?,
            minio_secret_key: std::env::var("MINIO_SECRET_KEY")?,
            inference,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
        })
    }
}
