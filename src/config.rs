//! Configuration for tapgen
//!
//! [`Settings`] is the persistent, file-backed configuration. It is read
//! from `--config <file>` or `<config_dir>/tapgen/config.toml`; a missing
//! file means defaults.
//!
//! ```toml
//! output_dir = "."
//!
//! [github]
//! api_url = "https://api.github.com"
//! token_env = "GITHUB_TOKEN"
//! user_agent = "tapgen"
//!
//! [download]
//! allow_insecure = false
//! verify_upstream_checksums = true
//!
//! [validator]
//! enabled = true
//! executable = "brew"
//! autofix = false
//! audit = false
//! ```
//!
//! [`GenerateConfig`] carries the per-invocation choices.

use crate::error::{GenError, GenResult};
use crate::github::{RepoRef, DEFAULT_API_URL};
use crate::manifest::ManifestKind;
use crate::validator::ValidateOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name under the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_user_agent() -> String {
    format!("tapgen/{}", crate::VERSION)
}

fn default_executable() -> String {
    "brew".to_string()
}

// ============================================================================
// Persistent settings
// ============================================================================

/// GitHub API access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubSettings {
    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            user_agent: default_user_agent(),
        }
    }
}

impl GitHubSettings {
    /// Token from the configured environment variable
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Download behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSettings {
    /// Permit plain HTTP URLs
    #[serde(default)]
    pub allow_insecure: bool,

    /// Probe for and verify upstream checksum manifests
    #[serde(default = "default_true")]
    pub verify_upstream_checksums: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            allow_insecure: false,
            verify_upstream_checksums: true,
        }
    }
}

/// External validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSettings {
    /// Run validation after writing
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Validator executable
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Attempt `style --fix` once on failure
    #[serde(default)]
    pub autofix: bool,

    /// Run audit (needs a tapped repository)
    #[serde(default)]
    pub audit: bool,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            executable: default_executable(),
            autofix: false,
            audit: false,
        }
    }
}

/// File-backed settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Tap root receiving `Casks/` and `Formula/`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub github: GitHubSettings,

    #[serde(default)]
    pub download: DownloadSettings,

    #[serde(default)]
    pub validator: ValidatorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            github: GitHubSettings::default(),
            download: DownloadSettings::default(),
            validator: ValidatorSettings::default(),
        }
    }
}

impl Settings {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tapgen").join(CONFIG_FILE_NAME))
    }

    /// Load settings from a file
    pub fn from_file(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GenError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Parse settings from a TOML string
    pub fn parse(content: &str) -> GenResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from an explicit path, or the default location when present
    ///
    /// An explicit path must exist; the default location may be absent.
    pub fn load(explicit: Option<&Path>) -> GenResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(target: "tapgen::config", path = %path.display(), "Loading settings");
                Self::from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Validation toggles derived from the validator section
    pub fn validate_options(&self) -> ValidateOptions {
        ValidateOptions {
            fix: self.validator.autofix,
            audit: self.validator.audit,
        }
    }
}

// ============================================================================
// Per-invocation configuration
// ============================================================================

/// What to generate in one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Source repository
    pub repository: RepoRef,
    /// Package name override (defaults to the repository name)
    pub name: Option<String>,
    /// Output root override
    pub output_dir: Option<PathBuf>,
    /// Requested manifest kind; `None` decides from the release assets
    pub kind: Option<ManifestKind>,
    /// Run the validator after writing
    pub validate: bool,
    /// Validation toggles
    pub validate_options: ValidateOptions,
}

impl GenerateConfig {
    /// Configuration for a repository with default toggles
    pub fn new(repository: RepoRef) -> Self {
        Self {
            repository,
            name: None,
            output_dir: None,
            kind: None,
            validate: true,
            validate_options: ValidateOptions::default(),
        }
    }

    /// Parse the repository argument and build a configuration
    pub fn for_repository(input: &str) -> GenResult<Self> {
        RepoRef::parse(input).map(Self::new)
    }

    /// Override the package name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the output root
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Force a manifest kind
    pub fn with_kind(mut self, kind: ManifestKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Enable or disable validation
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set validation toggles
    pub fn with_validate_options(mut self, options: ValidateOptions) -> Self {
        self.validate_options = options;
        self
    }

    /// Package name: override or repository name
    pub fn package_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.repository.repo)
    }

    /// Output root: override or settings
    pub fn resolve_output_dir(&self, settings: &Settings) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| settings.output_dir.clone())
    }
}
