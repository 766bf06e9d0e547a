//! HTTP client for the analysis service.
//!
//! Thin typed wrapper over the four backend endpoints. Calls are async and
//! carry no retry, cancellation, or timeout logic; the caller decides how a
//! failure surfaces to the user.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::model::{AnalysisReport, AnalyzeRequest};

/// Errors from talking to the analysis service.
///
/// `Network` means no usable response came back (connect failure, timeout,
/// aborted transfer). `Server` means the service answered and attached an
/// application-level error message. The two surface differently: a server
/// message is quoted to the user, a network failure gets a generic notice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("{0}")]
    Server(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Error body the service attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct FilesBody {
    files: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ExtensionsBody {
    extensions: Vec<String>,
}

/// Client for one analysis service instance.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Build a client for the service at `base_url`,
    /// e.g. `http://localhost:5000`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `GET /api/files`: names of the files known to the server.
    pub async fn list_files(&self) -> Result<Vec<String>, ApiError> {
        let resp = self.get("/api/files").await?;
        let body: FilesBody = decode(resp).await?;
        Ok(body.files)
    }

    /// `GET /api/extensions`: analysis modes the server supports.
    pub async fn list_extensions(&self) -> Result<Vec<String>, ApiError> {
        let resp = self.get("/api/extensions").await?;
        let body: ExtensionsBody = decode(resp).await?;
        Ok(body.extensions)
    }

    /// `POST /api/upload`: submit a local file as a multipart payload
    /// under the form field `file`.
    ///
    /// Returns the base name the file was submitted under, which is the
    /// name it will appear as in subsequent listings.
    pub async fn upload(&self, path: &Path) -> Result<String, ApiError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::Network(format!("not a file path: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Network(format!("could not read {}: {}", path.display(), e)))?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .http
            .post(format!("{}/api/upload", self.base))
            .multipart(form)
            .send()
            .await
            .map_err(into_network)?;
        check_status(resp).await?;
        Ok(name)
    }

    /// `POST /api/analyze`: analyze an uploaded file.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisReport, ApiError> {
        let resp = self
            .http
            .post(format!("{}/api/analyze", self.base))
            .json(request)
            .send()
            .await
            .map_err(into_network)?;
        let resp = check_status(resp).await?;
        decode(resp).await
    }

    async fn get(&self, route: &str) -> Result<reqwest::Response, ApiError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base, route))
            .send()
            .await
            .map_err(into_network)?;
        check_status(resp).await
    }
}

fn into_network(err: reqwest::Error) -> ApiError {
    log::warn!("transport error: {}", err);
    ApiError::Network(err.to_string())
}

/// Pass 2xx responses through; turn anything else into `ApiError::Server`,
/// preferring the message from an `{"error": ...}` body over the bare
/// status line.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    log::warn!("server error: {}", message);
    Err(ApiError::Server(message))
}

async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn transport_failure_is_a_network_error() {
        // Nothing listens on the discard port; the connect fails outright.
        let client = ApiClient::new("http://127.0.0.1:9");
        match client.list_files().await {
            Err(ApiError::Network(_)) => {}
            other => panic!("expected a network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn upload_of_a_missing_file_fails_before_the_network() {
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client
            .upload(Path::new("/nonexistent/benford-input.csv"))
            .await
            .unwrap_err();
        match err {
            ApiError::Network(msg) => assert!(msg.contains("could not read")),
            other => panic!("expected a network error, got {:?}", other),
        }
    }
}
