use crate::api::models::{ClipRequest, ClipResponse, RetrieveQuery};
use crate::config::settings::Config;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API response: {0}")]
    Api(String),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API reported success without a result")]
    EmptyResult,
}

/// Talks to the clip API: `/api/set` and `/api/get`.
#[derive(Debug, Clone)]
pub struct ClipClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl ClipClient {
    pub fn new(config: &Config, http_client: reqwest::Client) -> Self {
        Self {
            base_url: config.api_url.clone(),
            http_client,
        }
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Stores `url` and returns the code of the new clip.
    pub async fn create_clip(&self, url: &str) -> Result<String, ClientError> {
        let endpoint = self.build_url("/api/set");
        log::debug!("POST {} url={}", endpoint, url);

        let response = self
            .http_client
            .post(&endpoint)
            .form(&ClipRequest { url })
            .send()
            .await?;

        self.handle_clip_response(response).await
    }

    /// Resolves `code` back into the value it was created from.
    pub async fn retrieve_clip(&self, code: &str) -> Result<String, ClientError> {
        let endpoint = self.build_url("/api/get");
        log::debug!("GET {} code={}", endpoint, code);

        let response = self
            .http_client
            .get(&endpoint)
            .query(&RetrieveQuery { code })
            .send()
            .await?;

        self.handle_clip_response(response).await
    }

    async fn handle_clip_response(
        &self,
        response: reqwest::Response,
    ) -> Result<String, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        let decoded = match serde_json::from_str::<ClipResponse>(&body) {
            Ok(decoded) => decoded,
            Err(_) if !status.is_success() => {
                return Err(ClientError::Server {
                    status: status.as_u16(),
                    message: body,
                });
            }
            Err(e) => return Err(ClientError::Decode(e)),
        };

        match decoded {
            ClipResponse::Success(result) if result.is_empty() => Err(ClientError::EmptyResult),
            ClipResponse::Success(result) => Ok(result),
            ClipResponse::Error(message) => Err(ClientError::Api(message)),
        }
    }
}
