use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Body of every clip API reply, `{"status": ..., "result": ...}`.
///
/// Decoded once at the client boundary; callers only ever see the value or
/// the server message.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "result", rename_all = "lowercase")]
pub enum ClipResponse {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ClipRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrieveQuery<'a> {
    pub code: &'a str,
}

/// Presigned POST destination handed out by the upload API.
///
/// `fields` must be sent back untouched; `key` is where the object lands.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PresignedUploadTarget {
    pub url: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl PresignedUploadTarget {
    pub fn key(&self) -> Option<&str> {
        self.fields.get("key").map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PresignQuery<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub mime_type: &'a str,
    pub size: u64,
}

/// Local file facts gathered once before an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub size: u64,
    pub mime_type: String,
    pub name: String,
}

impl<'a> From<&'a FileDescriptor> for PresignQuery<'a> {
    fn from(file: &'a FileDescriptor) -> Self {
        PresignQuery {
            name: &file.name,
            mime_type: &file.mime_type,
            size: file.size,
        }
    }
}
