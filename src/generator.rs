//! Generation pipeline
//!
//! Repository metadata and the latest release are fetched, the release
//! assets are classified and one is selected. A usable tarball or AppImage
//! becomes a cask; otherwise the source tarball becomes a formula built with
//! the detected build system. The manifest is rendered, written under the
//! tap root and validated.

use crate::archive::{self, ArchiveLayout};
use crate::build_system::{detect_build_system, BuildStrategy};
use crate::checksum::{sha256_hex, ChecksumProber};
use crate::classifier::{classify_all, ClassifiedAsset, PackageFormat};
use crate::config::{GenerateConfig, Settings};
use crate::downloader::{Downloader, Fetch};
use crate::error::{GenError, GenResult};
use crate::github::{normalize_tag, GitHubClient, Release, ReleaseSource, RepoMetadata, RepoRef};
use crate::manifest::{normalize_description, DesktopIntegration, ManifestData, ManifestKind};
use crate::metrics::GenerationMetrics;
use crate::progress::GenerateProgress;
use crate::selector::select_asset;
use crate::validator::{validate_file, BrewValidator, ManifestValidator, ValidationOutcome};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Result of a generation run
#[derive(Debug)]
pub struct GenerationReport {
    /// Written manifest
    pub path: PathBuf,
    /// Cask or formula
    pub kind: ManifestKind,
    /// Data the manifest was rendered from
    pub manifest: ManifestData,
    /// Release tag the manifest points at
    pub tag: String,
    /// Selected release asset (casks)
    pub selected_asset: Option<String>,
    /// Detected build system (formulae)
    pub build_strategy: Option<BuildStrategy>,
    /// Validator results, when validation ran
    pub validation: Option<ValidationOutcome>,
}

/// Identity shared by both manifest kinds
struct PackageIdentity<'a> {
    name: &'a str,
    version: String,
    description: String,
    homepage: String,
    license: Option<String>,
}

/// Manifest generator
pub struct Generator {
    source: Box<dyn ReleaseSource>,
    fetcher: Box<dyn Fetch>,
    validator: Option<Box<dyn ManifestValidator>>,
    settings: Settings,
}

impl Generator {
    /// Create a generator over explicit collaborators, without a validator
    pub fn new(source: Box<dyn ReleaseSource>, fetcher: Box<dyn Fetch>, settings: Settings) -> Self {
        Self {
            source,
            fetcher,
            validator: None,
            settings,
        }
    }

    /// Create a generator talking to GitHub and `brew` as configured
    pub fn from_settings(settings: Settings, progress: Option<GenerateProgress>) -> Self {
        let token = settings.github.token();
        let api = Downloader::new(&settings.github.user_agent)
            .allow_insecure(settings.download.allow_insecure)
            .token(token.clone());
        let downloads = Downloader::new(&settings.github.user_agent)
            .allow_insecure(settings.download.allow_insecure)
            .token(token)
            .with_progress(progress);

        let source = GitHubClient::new(&settings.github.api_url, Box::new(api));
        let validator = settings
            .validator
            .enabled
            .then(|| BrewValidator::new(settings.validator.executable.clone()));

        let generator = Self::new(Box::new(source), Box::new(downloads), settings);
        match validator {
            Some(v) => generator.with_validator(Box::new(v)),
            None => generator,
        }
    }

    /// Attach a validator
    pub fn with_validator(mut self, validator: Box<dyn ManifestValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Settings in effect
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the whole pipeline and write the manifest
    ///
    /// When the validator still reports violations the file is left on disk
    /// and [`GenError::ValidationFailed`] names it.
    pub fn generate(&self, config: &GenerateConfig) -> GenResult<GenerationReport> {
        let mut metrics = GenerationMetrics::new();
        let repo = &config.repository;

        let metadata = metrics.time_phase("metadata", || self.source.repository(repo))?;
        let release = metrics.time_phase("release", || self.source.latest_release(repo))?;
        let name = config.package_name();
        let identity = Self::identity(name, &metadata, &release);

        info!(
            target: "tapgen::generate",
            repo = %repo,
            tag = %release.tag_name,
            version = %identity.version,
            "Generating manifest"
        );

        let plan = match config.kind {
            Some(ManifestKind::Formula) => None,
            _ => self.pick_prebuilt(&release, config.kind)?,
        };

        let (manifest, selected_asset, build_strategy) = match plan {
            Some(asset) => {
                let data = self.cask_data(&asset, &identity, &mut metrics)?;
                (data, Some(asset.asset.name.clone()), None)
            }
            None => {
                let (data, strategy) =
                    self.formula_data(repo, &release.tag_name, &identity, &mut metrics)?;
                (data, None, Some(strategy))
            }
        };

        let text = metrics.time_phase("render", || manifest.render())?;

        let kind = manifest.kind();
        let output_dir = config.resolve_output_dir(&self.settings);
        let path = kind.manifest_path(&output_dir, &manifest.token);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, text)?;
        info!(target: "tapgen::generate", path = %path.display(), kind = %kind, "Wrote manifest");

        let validation = self.validate(config, &path, &mut metrics)?;
        metrics.log_report();

        let report = GenerationReport {
            path,
            kind,
            manifest,
            tag: release.tag_name,
            selected_asset,
            build_strategy,
            validation,
        };

        if let Some(outcome) = &report.validation {
            outcome.ensure_passed()?;
        }
        Ok(report)
    }

    fn identity<'a>(
        name: &'a str,
        metadata: &RepoMetadata,
        release: &Release,
    ) -> PackageIdentity<'a> {
        let description = metadata
            .description
            .as_deref()
            .map(normalize_description)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| {
                info!(target: "tapgen::generate", "Repository has no description");
                format!("Command-line tool distributed as {}", name)
            });

        PackageIdentity {
            name,
            version: normalize_tag(&release.tag_name, name),
            description,
            homepage: metadata.homepage_or_repo(),
            license: metadata.license_spdx(),
        }
    }

    /// Select an asset that can become a cask, or `None` for the source path
    fn pick_prebuilt(
        &self,
        release: &Release,
        requested: Option<ManifestKind>,
    ) -> GenResult<Option<ClassifiedAsset>> {
        let classified = classify_all(release.assets.iter().cloned());

        let selected = match select_asset(&classified) {
            Ok(asset) => asset,
            Err(e) if requested == Some(ManifestKind::Cask) => return Err(e),
            Err(e) => {
                info!(target: "tapgen::generate", reason = %e, "Falling back to source formula");
                return Ok(None);
            }
        };

        let usable = selected.package_format.is_tarball()
            || selected.package_format == PackageFormat::AppImage;
        if usable {
            return Ok(Some(selected.clone()));
        }
        if requested == Some(ManifestKind::Cask) {
            return Err(GenError::UnsupportedArchive(selected.asset.name.clone()));
        }
        info!(
            target: "tapgen::generate",
            asset = %selected.asset.name,
            format = %selected.package_format,
            "Selected asset cannot be staged as a cask, falling back to source formula"
        );
        Ok(None)
    }

    fn cask_data(
        &self,
        asset: &ClassifiedAsset,
        identity: &PackageIdentity<'_>,
        metrics: &mut GenerationMetrics,
    ) -> GenResult<ManifestData> {
        let url = &asset.asset.download_url;
        let bytes = metrics.time_phase("download", || self.fetcher.get_bytes(url))?;
        let sha256 = metrics.time_phase("checksum", || self.digest(url, asset.name(), &bytes))?;

        let (binary_path, layout) = if asset.package_format == PackageFormat::AppImage {
            (asset.asset.name.clone(), None)
        } else {
            let layout = metrics.time_phase("introspect", || -> GenResult<ArchiveLayout> {
                let members = archive::list_members(&bytes, asset.name())?;
                Ok(archive::introspect(&members, identity.name))
            })?;
            (layout.require_binary(identity.name)?.to_string(), Some(layout))
        };

        let mut data = ManifestData::cask(
            identity.name,
            &identity.version,
            url,
            &sha256,
            &binary_path,
        )
        .with_description(&identity.description)
        .with_homepage(identity.homepage.clone())
        .with_license(identity.license.clone());

        if let Some(layout) = layout {
            let binary_name = binary_path.rsplit('/').next().unwrap_or(&binary_path);
            let desktop = DesktopIntegration::from_layout(&data.token, &layout);
            data = data.with_binary_name(binary_name).with_desktop(desktop);
        }
        Ok(data)
    }

    fn formula_data(
        &self,
        repo: &RepoRef,
        tag: &str,
        identity: &PackageIdentity<'_>,
        metrics: &mut GenerationMetrics,
    ) -> GenResult<(ManifestData, BuildStrategy)> {
        let files = metrics.time_phase("root_files", || self.source.root_files(repo, tag))?;
        let strategy = detect_build_system(&files)?;

        let url = repo.source_tarball_url(tag);
        let bytes = metrics.time_phase("download", || self.fetcher.get_bytes(&url))?;
        let sha256 = sha256_hex(&bytes);

        let data = ManifestData::formula(identity.name, &identity.version, &url, &sha256, strategy)
            .with_description(&identity.description)
            .with_homepage(identity.homepage.clone())
            .with_license(identity.license.clone());
        Ok((data, strategy))
    }

    fn digest(&self, url: &str, name: &str, bytes: &[u8]) -> GenResult<String> {
        if self.settings.download.verify_upstream_checksums {
            ChecksumProber::new(self.fetcher.as_ref()).verify_asset(url, name, bytes)
        } else {
            Ok(sha256_hex(bytes))
        }
    }

    fn validate(
        &self,
        config: &GenerateConfig,
        path: &std::path::Path,
        metrics: &mut GenerationMetrics,
    ) -> GenResult<Option<ValidationOutcome>> {
        if !config.validate {
            return Ok(None);
        }
        let Some(validator) = self.validator.as_deref() else {
            warn!(target: "tapgen::generate", "No validator configured, manifest left unvalidated");
            return Ok(None);
        };
        let outcome = metrics.time_phase("validate", || {
            validate_file(validator, path, config.validate_options)
        })?;
        Ok(Some(outcome))
    }
}
