use std::fs::File;
use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use crate::api::models::{FileDescriptor, PresignQuery, PresignedUploadTarget};
use crate::config::settings::Config;
use crate::util::format::format_bytes;
use crate::util::fs::{open_for_upload, FileError};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error("File is too big! ({size} bytes, the limit is {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to get presigned URL: {0}")]
    Presign(String),

    #[error("Error decoding presign response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Presign response has no `key` field")]
    MissingKey,

    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// Two-phase upload: ask the upload API for a presigned POST target, then
/// send the file straight to storage.
#[derive(Debug, Clone)]
pub struct UploadClient {
    base_url: String,
    files_url: String,
    max_file_size: u64,
    http_client: reqwest::Client,
}

impl UploadClient {
    pub fn new(config: &Config, http_client: reqwest::Client) -> Self {
        Self {
            base_url: config.upload_url.clone(),
            files_url: config.files_url.clone(),
            max_file_size: config.max_file_size,
            http_client,
        }
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Public URL of an object stored under `key`.
    pub fn file_url(&self, key: &str) -> String {
        format!("{}/{}", self.files_url.trim_end_matches('/'), key)
    }

    /// Uploads the file at `path` and returns its public URL.
    ///
    /// Local problems are reported before any request is made. The file is
    /// opened exactly once; the handle is consumed by the upload body.
    pub async fn upload(&self, path: &Path) -> Result<String, UploadError> {
        let (descriptor, file) = open_for_upload(path)?;

        log::debug!("Uploading {} as {}", descriptor.path.display(), descriptor.name);
        log::info!("File size: {}", format_bytes(descriptor.size));
        if descriptor.size > self.max_file_size {
            return Err(UploadError::FileTooLarge {
                size: descriptor.size,
                limit: self.max_file_size,
            });
        }

        log::info!("Preparing upload...");
        let target = self.presign(&descriptor).await?;
        let key = target.key().ok_or(UploadError::MissingKey)?.to_string();

        log::info!("Got presigned URL. Uploading file...");
        self.send(&target, &descriptor, file).await?;

        log::info!("File uploaded successfully!");
        Ok(self.file_url(&key))
    }

    /// Phase 1: `GET /api/uploadFile?name=..&type=..&size=..`.
    pub async fn presign(
        &self,
        descriptor: &FileDescriptor,
    ) -> Result<PresignedUploadTarget, UploadError> {
        let endpoint = self.build_url("/api/uploadFile");
        log::debug!(
            "GET {} name={} type={} size={}",
            endpoint,
            descriptor.name,
            descriptor.mime_type,
            descriptor.size
        );

        let response = self
            .http_client
            .get(&endpoint)
            .query(&PresignQuery::from(descriptor))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(UploadError::Presign(presign_failure(status, &body)));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Phase 2: multipart POST of the presigned fields followed by the file.
    pub async fn send(
        &self,
        target: &PresignedUploadTarget,
        descriptor: &FileDescriptor,
        file: File,
    ) -> Result<(), UploadError> {
        let mut form = Form::new();
        for (name, value) in &target.fields {
            form = form.text(name.clone(), value.clone());
        }

        let body = reqwest::Body::from(tokio::fs::File::from_std(file));
        let part = Part::stream_with_length(body, descriptor.size)
            .file_name(descriptor.name.clone())
            .mime_str(&descriptor.mime_type)?;
        // storage expects the file after every policy field
        form = form.part("file", part);

        log::debug!("POST {} ({} fields + file)", target.url, target.fields.len());
        let response = self
            .http_client
            .post(&target.url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message: upload_failure(status, &body),
            });
        }

        Ok(())
    }
}

fn presign_failure(status: StatusCode, body: &str) -> String {
    match status.as_u16() {
        404 => "API endpoint not found".to_string(),
        503 => serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("result").and_then(|r| r.as_str()).map(str::to_string))
            .unwrap_or_else(|| status.to_string()),
        _ => status.to_string(),
    }
}

// storage replies with an S3-style XML error document
fn upload_failure(status: StatusCode, body: &str) -> String {
    match xml_tag(body, "Code") {
        Some("EntityTooLarge") => match xml_tag(body, "ProposedSize").and_then(|s| s.parse().ok()) {
            Some(size) => format!("File too large ({})", format_bytes(size)),
            None => "File too large".to_string(),
        },
        Some("AccessDenied") => "Access denied to the bucket".to_string(),
        _ => format!("Upload failed with HTTP {}", status),
    }
}

fn xml_tag<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].trim())
}
