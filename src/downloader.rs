//! HTTP download of release metadata, assets and checksum manifests
//!
//! This module provides:
//! - The [`Fetch`] seam the pipeline downloads through
//! - A blocking [`Downloader`] built on `ureq`
//! - Security controls (HTTPS enforcement, token only sent to GitHub hosts)
//!
//! Everything is buffered in memory. There is no cache and no retry: a failed
//! request ends the invocation.

use crate::error::{GenError, GenResult};
use crate::progress::GenerateProgress;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Hosts that receive the API token
const TOKEN_HOSTS: &[&str] = &["api.github.com", "github.com"];

/// Byte source used by the pipeline
///
/// Implemented by [`Downloader`] for real requests and by in-memory fakes in
/// tests.
pub trait Fetch {
    /// Fetch a URL, returning `None` when the server answers 404
    fn fetch(&self, url: &str) -> GenResult<Option<Vec<u8>>>;

    /// Fetch a URL that must exist
    fn get_bytes(&self, url: &str) -> GenResult<Vec<u8>> {
        self.fetch(url)?
            .ok_or_else(|| GenError::Http(format!("Not found: {}", url)))
    }
}

/// Blocking HTTP downloader
pub struct Downloader {
    agent: ureq::Agent,
    /// Allow plain HTTP downloads
    allow_insecure: bool,
    /// Bearer token for GitHub hosts
    token: Option<String>,
    /// Display that download bars are added to
    progress: Option<GenerateProgress>,
}

impl Downloader {
    /// Create a new downloader with the given User-Agent
    pub fn new(user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(user_agent)
            .timeout_connect(Duration::from_secs(30))
            .build();
        Self {
            agent,
            allow_insecure: false,
            token: None,
            progress: None,
        }
    }

    /// Set insecure mode
    pub fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    /// Set the GitHub token
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Draw download bars on a shared progress display
    pub fn with_progress(mut self, progress: Option<GenerateProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Validate URL against security rules
    fn validate_url(&self, url: &str) -> GenResult<url::Url> {
        let parsed = url::Url::parse(url)
            .map_err(|e| GenError::Config(format!("Invalid URL {}: {}", url, e)))?;

        if !self.allow_insecure && parsed.scheme() != "https" {
            warn!(
                target: "tapgen::download",
                url = %url,
                scheme = %parsed.scheme(),
                "Insecure protocol blocked"
            );
            return Err(GenError::Config(format!(
                "Insecure URL scheme ({}), HTTPS required. Set download.allow_insecure to bypass.",
                parsed.scheme()
            )));
        }

        Ok(parsed)
    }

    /// Whether the token may be sent to this URL
    fn sends_token(parsed: &url::Url) -> bool {
        parsed
            .host_str()
            .map(|host| TOKEN_HOSTS.contains(&host))
            .unwrap_or(false)
    }

    fn read_body(&self, url: &str, response: ureq::Response) -> GenResult<Vec<u8>> {
        let total = response
            .header("Content-Length")
            .and_then(|v| v.parse::<u64>().ok());

        let mut buffer = Vec::new();
        let mut reader = response.into_reader();

        match (total, &self.progress) {
            (Some(len), Some(progress)) if len > 0 => {
                let pb = progress.download(len, file_name_of(url));
                pb.wrap_read(reader)
                    .read_to_end(&mut buffer)
                    .map_err(|e| GenError::Http(format!("Failed to read response: {}", e)))?;
                pb.finish_and_clear();
            }
            _ => {
                reader
                    .read_to_end(&mut buffer)
                    .map_err(|e| GenError::Http(format!("Failed to read response: {}", e)))?;
            }
        }

        debug!(
            target: "tapgen::download",
            url = %url,
            bytes = buffer.len(),
            "Downloaded"
        );
        Ok(buffer)
    }
}

impl Fetch for Downloader {
    fn fetch(&self, url: &str) -> GenResult<Option<Vec<u8>>> {
        let parsed = self.validate_url(url)?;

        let mut request = self.agent.get(url);
        if let Some(ref token) = self.token {
            if Self::sends_token(&parsed) {
                request = request.set("Authorization", &format!("Bearer {}", token));
            }
        }
        if parsed.host_str() == Some("api.github.com") {
            request = request.set("Accept", "application/vnd.github+json");
        }

        match request.call() {
            Ok(response) => self.read_body(url, response).map(Some),
            Err(ureq::Error::Status(404, _)) => {
                debug!(target: "tapgen::download", url = %url, "Not found");
                Ok(None)
            }
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                info!(
                    target: "tapgen::download",
                    url = %url,
                    status = code,
                    "Request rejected"
                );
                Err(GenError::Http(format!(
                    "{} returned HTTP {}: {}",
                    url,
                    code,
                    body.trim()
                )))
            }
            Err(e) => Err(GenError::Http(format!("Failed to download {}: {}", url, e))),
        }
    }
}

/// Last path segment of a URL, used for display
pub(crate) fn file_name_of(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
