use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ServiceError;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration, sourced from the environment.
pub struct Config {
    pub port: u16,
    pub body_limit_bytes: usize,
    pub model_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let body_limit_bytes = {
            let mb = env::var("BODY_LIMIT_MB")
                .unwrap_or_else(|_| "5".into())
                .parse::<usize>()
                .expect("BODY_LIMIT_MB must be a valid integer");
            mb * 1024 * 1024
        };

        let port = env::var("PORT")
            .unwrap_or_else(|_| "5020".into())
            .parse::<u16>()
            .expect("PORT must be a valid number between 0 and 65535");

        let model_path = env::var("MODEL_PATH").ok().map(PathBuf::from);

        Self {
            port,
            body_limit_bytes,
            model_path,
        }
    }
}

/// Download image bytes from a URL.
pub async fn fetch_image(url: &str) -> Result<Vec<u8>, ServiceError> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .timeout(DOWNLOAD_TIMEOUT)
        .send()
        .await?
        .error_for_status()?;

    Ok(response.bytes().await?.to_vec())
}
