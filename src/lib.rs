//! tapgen - Homebrew-style Linux manifests from GitHub releases
//!
//! This crate turns a repository's latest published release into a package
//! manifest: a **cask** when a prebuilt release asset can be installed as
//! is, or a **formula** that builds the tagged source when none can.
//!
//! # Pipeline
//!
//! 1. Classify every release asset by OS family, architecture and format
//! 2. Select the canonical Linux asset (tarballs before `.deb`, x86-64 first)
//! 3. Download it and verify it against any published checksum manifest
//! 4. Introspect the archive for the binary, a desktop entry and an icon,
//!    or detect the build system when falling back to source
//! 5. Render the Ruby DSL and write `Casks/<token>.rb` or `Formula/<token>.rb`
//! 6. Validate with `brew style` (and `brew audit` on request)
//!
//! # Quick Start
//!
//! ```bash
//! # Generate into the current tap
//! tapgen generate sharkdp/bat
//!
//! # Force a formula and skip validation
//! tapgen generate owner/tool --kind formula --no-validate
//!
//! # Check how asset names classify
//! tapgen classify tool-1.0-linux-x86_64.tar.gz tool_1.0_amd64.deb
//! ```
//!
//! # Library usage
//!
//! ```no_run
//! use tapgen::{GenerateConfig, Generator, Settings};
//!
//! let settings = Settings::load(None)?;
//! let generator = Generator::from_settings(settings, None);
//! let report = generator.generate(&GenerateConfig::for_repository("sharkdp/bat")?)?;
//! println!("wrote {}", report.path.display());
//! # Ok::<(), tapgen::GenError>(())
//! ```

pub mod archive;
pub mod build_system;
pub mod checksum;
pub mod classifier;
mod config;
mod downloader;
mod error;
mod generator;
pub mod github;
pub mod icon;
pub mod manifest;
mod metrics;
pub mod progress;
pub mod selector;
pub mod validator;

pub use archive::{introspect, list_members, ArchiveKind, ArchiveLayout, ArchiveMember};
pub use build_system::{detect_build_system, BuildStrategy};
pub use checksum::{parse_checksum_file, sha256_hex, ChecksumProber};
pub use classifier::{
    classify, classify_all, Architecture, ClassifiedAsset, OsFamily, PackageFormat, ReleaseAsset,
};
pub use config::{
    DownloadSettings, GenerateConfig, GitHubSettings, Settings, ValidatorSettings,
};
pub use downloader::{Downloader, Fetch};
pub use error::{GenError, GenResult};
pub use generator::{GenerationReport, Generator};
pub use github::{GitHubClient, Release, ReleaseSource, RepoMetadata, RepoRef};
pub use icon::{best_icon, IconCandidate, IconFormat, IconSizeToken};
pub use manifest::{
    DesktopIntegration, Installation, ManifestBuilder, ManifestData, ManifestDocument,
    ManifestKind, Section,
};
pub use metrics::GenerationMetrics;
pub use progress::{GenerateProgress, ProgressExt, ProgressStyles};
pub use selector::select_asset;
pub use validator::{
    validate_directory, validate_file, BrewValidator, ManifestValidator, ValidateOptions,
    ValidationCheck, ValidationOutcome, ValidationReport,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
