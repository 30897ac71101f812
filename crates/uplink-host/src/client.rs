//! Remote video host capability and its reqwest implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uplink_core::{AppError, Config};

/// Placeholder created on the host: where to upload, and the id the host
/// assigned. Both fields are always present on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderUpload {
    pub upload_link: String,
    pub media_id: String,
}

/// Result of a remote delete. "Already gone" is what callers treat as
/// success: the end state matters, not the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyGone,
}

/// Account the configured credential belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct HostAccount {
    pub name: String,
    pub uri: String,
}

#[async_trait]
pub trait VideoHost: Send + Sync {
    /// Create a placeholder for a resumable upload of `size_bytes`.
    async fn create_placeholder(
        &self,
        size_bytes: u64,
        name: &str,
    ) -> Result<PlaceholderUpload, AppError>;

    /// Delete the remote object. A 404/410 from the host maps to
    /// [`DeleteOutcome::AlreadyGone`], not an error.
    async fn delete_video(&self, media_id: &str) -> Result<DeleteOutcome, AppError>;

    /// Add the video to the configured showcase. No-op when no showcase is
    /// configured.
    async fn add_to_showcase(&self, media_id: &str) -> Result<(), AppError>;

    /// Credential probe, used by readiness checks.
    async fn whoami(&self) -> Result<HostAccount, AppError>;
}

#[derive(Serialize)]
struct CreateVideoRequest<'a> {
    upload: UploadSettings,
    name: &'a str,
    privacy: PrivacySettings<'a>,
}

#[derive(Serialize)]
struct UploadSettings {
    approach: &'static str,
    size: u64,
}

#[derive(Serialize)]
struct PrivacySettings<'a> {
    view: &'a str,
}

#[derive(Deserialize)]
struct CreateVideoResponse {
    uri: String,
    upload: UploadInfo,
}

#[derive(Deserialize)]
struct UploadInfo {
    upload_link: String,
}

/// Vimeo-style API client.
pub struct RemoteHost {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
    default_privacy: String,
    showcase_id: Option<String>,
}

impl RemoteHost {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| AppError::RemoteHost(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.host_api_base().trim_end_matches('/').to_string(),
            access_token: config.host_access_token().to_string(),
            default_privacy: config.host_default_privacy().to_string(),
            showcase_id: config.host_showcase_id().map(str::to_string),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(&self.access_token)
            .header(
                reqwest::header::ACCEPT,
                "application/vnd.vimeo.*+json;version=3.4",
            )
    }
}

#[async_trait]
impl VideoHost for RemoteHost {
    async fn create_placeholder(
        &self,
        size_bytes: u64,
        name: &str,
    ) -> Result<PlaceholderUpload, AppError> {
        let body = CreateVideoRequest {
            upload: UploadSettings {
                approach: "tus",
                size: size_bytes,
            },
            name,
            privacy: PrivacySettings {
                view: &self.default_privacy,
            },
        };

        let response = self
            .request(reqwest::Method::POST, "/me/videos")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::RemoteHost(format!("Create placeholder failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteHost(format!(
                "Create placeholder returned {}: {}",
                status, detail
            )));
        }

        let created: CreateVideoResponse = response
            .json()
            .await
            .map_err(|e| AppError::RemoteHost(format!("Undecodable create response: {e}")))?;

        // The host reports the video as a URI like "/videos/12345".
        let media_id = created
            .uri
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::RemoteHost(format!("Create response has no video id: {}", created.uri))
            })?
            .to_string();

        debug!(media_id, size_bytes, "Created upload placeholder");

        Ok(PlaceholderUpload {
            upload_link: created.upload.upload_link,
            media_id,
        })
    }

    async fn delete_video(&self, media_id: &str) -> Result<DeleteOutcome, AppError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/videos/{}", media_id))
            .send()
            .await
            .map_err(|e| AppError::RemoteHost(format!("Delete failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(DeleteOutcome::Deleted);
        }
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            debug!(media_id, "Video already absent on host");
            return Ok(DeleteOutcome::AlreadyGone);
        }

        Err(AppError::RemoteHost(format!(
            "Delete of {} returned {}",
            media_id, status
        )))
    }

    async fn add_to_showcase(&self, media_id: &str) -> Result<(), AppError> {
        let Some(showcase_id) = self.showcase_id.as_deref() else {
            debug!(media_id, "No showcase configured; skipping");
            return Ok(());
        };

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/me/albums/{}/videos/{}", showcase_id, media_id),
            )
            .send()
            .await
            .map_err(|e| AppError::RemoteHost(format!("Add to showcase failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::RemoteHost(format!(
                "Add of {} to showcase {} returned {}",
                media_id, showcase_id, status
            )));
        }

        Ok(())
    }

    async fn whoami(&self) -> Result<HostAccount, AppError> {
        let response = self
            .request(reqwest::Method::GET, "/me")
            .send()
            .await
            .map_err(|e| AppError::RemoteHost(format!("Whoami failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Credential probe rejected by host");
            return Err(AppError::RemoteHost(format!("Whoami returned {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::RemoteHost(format!("Undecodable whoami response: {e}")))
    }
}
