//! GitHub repository metadata and release listing
//!
//! The pipeline talks to the release host through [`ReleaseSource`];
//! [`GitHubClient`] implements it over the REST API using any [`Fetch`].

use crate::classifier::ReleaseAsset;
use crate::downloader::Fetch;
use crate::error::{GenError, GenResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Default REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// An `owner/repo` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl RepoRef {
    /// Create a reference from its parts
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse `owner/repo`, `github.com/owner/repo` or a full GitHub URL
    pub fn parse(input: &str) -> GenResult<Self> {
        let trimmed = input.trim();
        let invalid = || GenError::InvalidRepository(input.to_string());

        let path = if trimmed.contains("://") {
            let url = url::Url::parse(trimmed).map_err(|_| invalid())?;
            if url.host_str() != Some("github.com") && url.host_str() != Some("www.github.com") {
                return Err(invalid());
            }
            url.path().to_string()
        } else if let Some(rest) = trimmed.strip_prefix("github.com/") {
            rest.to_string()
        } else {
            trimmed.to_string()
        };

        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let owner = segments.next().ok_or_else(invalid)?;
        let repo = segments.next().ok_or_else(invalid)?;
        let repo = repo.strip_suffix(".git").unwrap_or(repo);

        // Bare `owner/repo` must not carry extra segments
        if !trimmed.contains("github.com") && segments.next().is_some() {
            return Err(invalid());
        }
        if !is_valid_segment(owner) || !is_valid_segment(repo) {
            return Err(invalid());
        }

        Ok(Self::new(owner, repo))
    }

    /// Browser URL of the repository
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }

    /// Source tarball for a tag
    pub fn source_tarball_url(&self, tag: &str) -> String {
        format!(
            "https://github.com/{}/{}/archive/refs/tags/{}.tar.gz",
            self.owner, self.repo, tag
        )
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// License block of the repository API response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoLicense {
    #[serde(default)]
    pub spdx_id: Option<String>,
}

/// Repository metadata used for the manifest identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub license: Option<RepoLicense>,
}

impl RepoMetadata {
    /// SPDX identifier, ignoring GitHub's `NOASSERTION` placeholder
    pub fn license_spdx(&self) -> Option<String> {
        self.license
            .as_ref()
            .and_then(|l| l.spdx_id.clone())
            .filter(|id| !id.is_empty() && id != "NOASSERTION")
    }

    /// Project homepage, falling back to the repository page
    pub fn homepage_or_repo(&self) -> String {
        self.homepage
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(&self.html_url)
            .to_string()
    }
}

/// A published release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Stable, published release
    pub fn is_stable(&self) -> bool {
        !self.prerelease && !self.draft
    }
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Where repository metadata and releases come from
pub trait ReleaseSource {
    /// Repository metadata
    fn repository(&self, repo: &RepoRef) -> GenResult<RepoMetadata>;

    /// Latest stable release
    fn latest_release(&self, repo: &RepoRef) -> GenResult<Release>;

    /// All releases, newest first
    fn releases(&self, repo: &RepoRef) -> GenResult<Vec<Release>>;

    /// File names in the repository root at `git_ref`
    fn root_files(&self, repo: &RepoRef, git_ref: &str) -> GenResult<Vec<String>>;
}

/// [`ReleaseSource`] backed by the GitHub REST API
pub struct GitHubClient {
    api_url: String,
    fetcher: Box<dyn Fetch>,
}

impl GitHubClient {
    /// Create a client against `api_url`
    pub fn new(api_url: &str, fetcher: Box<dyn Fetch>) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            fetcher,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> GenResult<Option<T>> {
        let url = format!("{}{}", self.api_url, path);
        debug!(target: "tapgen::github", url = %url, "GET");
        match self.fetcher.fetch(&url)? {
            Some(body) => Ok(Some(serde_json::from_slice(&body)?)),
            None => Ok(None),
        }
    }
}

impl ReleaseSource for GitHubClient {
    fn repository(&self, repo: &RepoRef) -> GenResult<RepoMetadata> {
        self.get_json(&format!("/repos/{}/{}", repo.owner, repo.repo))?
            .ok_or_else(|| GenError::InvalidRepository(format!("{} does not exist", repo)))
    }

    fn latest_release(&self, repo: &RepoRef) -> GenResult<Release> {
        let latest: Option<Release> =
            self.get_json(&format!("/repos/{}/{}/releases/latest", repo.owner, repo.repo))?;
        let release = latest.ok_or_else(|| GenError::NoReleases(repo.to_string()))?;
        info!(
            target: "tapgen::github",
            repo = %repo,
            tag = %release.tag_name,
            assets = release.assets.len(),
            "Found latest release"
        );
        Ok(release)
    }

    fn releases(&self, repo: &RepoRef) -> GenResult<Vec<Release>> {
        Ok(self
            .get_json(&format!("/repos/{}/{}/releases", repo.owner, repo.repo))?
            .unwrap_or_default())
    }

    fn root_files(&self, repo: &RepoRef, git_ref: &str) -> GenResult<Vec<String>> {
        let entries: Vec<ContentEntry> = self
            .get_json(&format!(
                "/repos/{}/{}/contents?ref={}",
                repo.owner, repo.repo, git_ref
            ))?
            .unwrap_or_default();
        Ok(entries
            .into_iter()
            .filter(|e| e.kind == "file")
            .map(|e| e.name)
            .collect())
    }
}

/// Pick the newest stable release from a list
pub fn newest_stable(releases: &[Release]) -> Option<&Release> {
    releases.iter().find(|r| r.is_stable())
}

/// Strip tag decorations down to the version (`v1.2.3`, `tool-1.2.3` -> `1.2.3`)
pub fn normalize_tag(tag: &str, package_name: &str) -> String {
    let name = package_name.to_lowercase();
    let prefixes = [format!("{}-", name), format!("{}_", name)];

    let mut version = tag.trim();
    let mut changed = true;
    while changed {
        changed = false;
        for p in &prefixes {
            if version.len() > p.len()
                && version.is_char_boundary(p.len())
                && version[..p.len()].eq_ignore_ascii_case(p)
            {
                version = &version[p.len()..];
                changed = true;
            }
        }
        if let Some(rest) = version
            .strip_prefix('v')
            .or_else(|| version.strip_prefix('V'))
        {
            if rest.starts_with(|c: char| c.is_ascii_digit()) {
                version = rest;
                changed = true;
            }
        }
    }

    if version.starts_with(|c: char| c.is_ascii_digit()) {
        return version.to_string();
    }

    // Unknown prefix such as `release-1.2.3`
    let bytes = version.as_bytes();
    (1..bytes.len())
        .find(|&i| bytes[i].is_ascii_digit() && matches!(bytes[i - 1], b'-' | b'_' | b'v'))
        .map(|i| version[i..].to_string())
        .unwrap_or_else(|| version.to_string())
}
