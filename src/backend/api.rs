//! Remote backend: one synchronous HTTP POST per job.
//!
//! The raw PDF bytes go up as the request body; parse configuration
//! travels as query parameters and credentials as headers. Success is
//! HTTP 200 **and** a string at `result.markdown` in the JSON body —
//! anything else fails the job with the response body as diagnostic
//! text, truncated so a misbehaving endpoint can't flood the report.

use crate::backend::{stem, write_markdown, Converter};
use crate::config::{ApiParams, BatchConfig};
use crate::error::{JobError, PdfmillError};
use crate::job::Job;
use crate::logsink::BatchLog;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Longest response-body excerpt carried in an error message.
const MAX_BODY_EXCERPT: usize = 600;

/// Converter that POSTs each PDF to a parse-to-Markdown REST endpoint.
#[derive(Debug)]
pub struct ApiConverter {
    client: reqwest::Client,
    url: String,
    app_id: String,
    secret_code: String,
    params: ApiParams,
    output_dir: PathBuf,
}

impl ApiConverter {
    pub fn from_config(config: &BatchConfig) -> Result<Self, PdfmillError> {
        let app_id = config
            .app_id
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                PdfmillError::InvalidConfig("API backend requires app_id".into())
            })?;
        let secret_code = config
            .secret_code
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                PdfmillError::InvalidConfig("API backend requires secret_code".into())
            })?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| PdfmillError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.api_url.clone(),
            app_id,
            secret_code,
            params: config.api_params.clone(),
            output_dir: config.output_dir.clone(),
        })
    }
}

#[async_trait]
impl Converter for ApiConverter {
    fn name(&self) -> &'static str {
        "api"
    }

    fn output_path(&self, source: &Path) -> PathBuf {
        self.output_dir.join(format!("{}.md", stem(source)))
    }

    async fn convert(&self, job: &Job, log: &BatchLog) -> Result<(), JobError> {
        let bytes = tokio::fs::read(&job.source)
            .await
            .map_err(|source| JobError::InputRead {
                path: job.source.clone(),
                source,
            })?;

        log.info(&job.file_name(), format!("uploading {} bytes", bytes.len()));

        let response = self
            .client
            .post(&self.url)
            .query(&self.params.to_query())
            .header("x-app-id", &self.app_id)
            .header("x-secret-code", &self.secret_code)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("API answered {} with {} bytes for {}", status, body.len(), job.file_name());

        if !status.is_success() {
            return Err(JobError::ApiStatus {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let markdown = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .as_ref()
            .and_then(|v| v.pointer("/result/markdown"))
            .and_then(|m| m.as_str())
            .map(str::to_owned)
            .ok_or_else(|| JobError::ApiShape {
                body: excerpt(&body),
            })?;

        write_markdown(&job.expected_output, &markdown).await
    }
}

/// Cap a response body for inclusion in an error message.
fn excerpt(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_EXCERPT {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX_BODY_EXCERPT).collect();
        format!("{cut}\u{2026}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;

    fn api_config() -> BatchConfig {
        BatchConfig::builder()
            .backend(BackendKind::Api)
            .credentials("app", "secret")
            .output_dir("/out")
            .build()
            .unwrap()
    }

    #[test]
    fn from_config_requires_credentials() {
        let mut config = api_config();
        config.app_id = None;
        let err = ApiConverter::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("app_id"), "got: {err}");
    }

    #[test]
    fn output_path_is_flat_stem_md() {
        let c = ApiConverter::from_config(&api_config()).unwrap();
        assert_eq!(
            c.output_path(Path::new("/in/report.pdf")),
            PathBuf::from("/out/report.md")
        );
    }

    #[test]
    fn excerpt_keeps_short_bodies_verbatim() {
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let long = "x".repeat(2000);
        let cut = excerpt(&long);
        assert!(cut.chars().count() <= MAX_BODY_EXCERPT + 1);
        assert!(cut.ends_with('\u{2026}'));
    }

    #[test]
    fn markdown_key_is_found_via_pointer() {
        let body = r##"{"result":{"markdown":"# Hi","pages":3}}"##;
        let v: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            v.pointer("/result/markdown").and_then(|m| m.as_str()),
            Some("# Hi")
        );
    }
}
