//! HTTP sidecar OCR backend.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{BackendKind, OcrBackend};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Sidecar response body.
#[derive(Debug, Deserialize)]
struct SidecarResponse {
    text: String,
}

pub struct SidecarBackend {
    url: String,
    client: reqwest::Client,
}

impl SidecarBackend {
    /// Only create the backend if a sidecar URL is configured.
    pub fn from_url(client: reqwest::Client, url: Option<String>) -> Option<Self> {
        url.map(|url| Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create the backend only if a URL is configured and `GET <url>/health`
    /// answers with a success status.
    pub async fn detect(client: reqwest::Client, url: Option<String>) -> Option<Self> {
        let backend = Self::from_url(client, url)?;
        let health = format!("{}/health", backend.url);

        match backend
            .client
            .get(&health)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => Some(backend),
            Ok(response) => {
                debug!("OCR sidecar health check returned {}", response.status());
                None
            }
            Err(e) => {
                debug!("OCR sidecar not reachable at {}: {}", health, e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl OcrBackend for SidecarBackend {
    fn name(&self) -> &str {
        BackendKind::Sidecar.as_str()
    }

    async fn extract(&self, image: &Path) -> anyhow::Result<String> {
        use reqwest::multipart::{Form, Part};

        let data = tokio::fs::read(image).await?;
        let filename = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_string());
        debug!("SidecarBackend: posting {} ({} bytes)", filename, data.len());

        let part = Part::bytes(data)
            .file_name(filename)
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/ocr", self.url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OCR sidecar error ({}): {}", status, error_text);
        }

        let result: SidecarResponse = response.json().await?;
        Ok(result.text)
    }
}
