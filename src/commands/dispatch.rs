use std::ffi::OsStr;

use crate::api::client::{ClientError, ClipClient};
use crate::api::upload::{UploadClient, UploadError};
use crate::config::settings::{Config, RunOptions};
use crate::input::classifier::{classify, Input};

pub const UNRECOGNIZED_MESSAGE: &str =
    "Failed to detect input type. Please use a URL, clip code or a file path.";

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{}", UNRECOGNIZED_MESSAGE)]
    Unrecognized,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Error creating clip for file: {0}")]
    ClipForFile(#[source] ClientError),

    #[error("Error creating clip: {0}")]
    CreateClip(#[source] ClientError),

    #[error("Error retrieving clip: {0}")]
    RetrieveClip(#[source] ClientError),
}

/// Routes one classified argument to the right client and produces the
/// single result string for the user.
pub struct Dispatcher {
    clips: ClipClient,
    uploads: UploadClient,
    options: RunOptions,
}

impl Dispatcher {
    pub fn new(clips: ClipClient, uploads: UploadClient, options: RunOptions) -> Self {
        Self {
            clips,
            uploads,
            options,
        }
    }

    pub fn from_config(config: &Config, options: RunOptions) -> Result<Self, reqwest::Error> {
        let http_client = config.http_client()?;
        Ok(Self::new(
            ClipClient::new(config, http_client.clone()),
            UploadClient::new(config, http_client),
            options,
        ))
    }

    pub async fn run(&self, arg: &OsStr) -> Result<String, DispatchError> {
        self.dispatch(classify(arg)).await
    }

    pub async fn dispatch(&self, input: Input) -> Result<String, DispatchError> {
        match input {
            Input::File(path) => {
                log::debug!("{} is a file", path.display());
                let file_url = self.uploads.upload(&path).await?;

                if self.options.upload_only {
                    return Ok(file_url);
                }

                self.clips
                    .create_clip(&file_url)
                    .await
                    .map_err(DispatchError::ClipForFile)
            }
            Input::Url(url) => {
                log::debug!("{} is a URL", url);
                self.clips
                    .create_clip(&url)
                    .await
                    .map_err(DispatchError::CreateClip)
            }
            Input::Code(code) => {
                log::debug!("{} is a clip code", code);
                self.clips
                    .retrieve_clip(&code)
                    .await
                    .map_err(DispatchError::RetrieveClip)
            }
            Input::Unrecognized(arg) => {
                log::debug!("{:?} matches no input type", arg);
                Err(DispatchError::Unrecognized)
            }
        }
    }
}
