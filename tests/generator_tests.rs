//! Tests for tapgen generation pipeline
//!
//! The release host, the download side and the validator are all in-memory
//! fakes, so the whole pipeline runs without a network or `brew`.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use tapgen::{
    sha256_hex, BuildStrategy, Fetch, GenError, GenResult, GenerateConfig, Generator,
    ManifestKind, ManifestValidator, Release, ReleaseAsset, ReleaseSource, RepoMetadata,
    RepoRef, Settings, ValidationCheck, ValidationReport,
};
use tempfile::TempDir;

const DOWNLOAD: &str = "https://github.com/o/tool/releases/download/v1.0.0/";
const SOURCE_TARBALL: &str = "https://github.com/o/tool/archive/refs/tags/v1.0.0.tar.gz";

// ============================================================================
// Fakes
// ============================================================================

struct FakeSource {
    description: Option<String>,
    releases: Vec<Release>,
    root_files: Vec<String>,
}

impl FakeSource {
    fn with_assets(names: &[&str]) -> Self {
        let assets = names
            .iter()
            .map(|name| ReleaseAsset::new(*name, format!("{}{}", DOWNLOAD, name), 1024))
            .collect();
        Self {
            description: Some("A fast tool.".to_string()),
            releases: vec![Release {
                tag_name: "v1.0.0".to_string(),
                prerelease: false,
                draft: false,
                assets,
            }],
            root_files: vec!["go.mod".to_string(), "README.md".to_string()],
        }
    }
}

impl ReleaseSource for FakeSource {
    fn repository(&self, repo: &RepoRef) -> GenResult<RepoMetadata> {
        Ok(RepoMetadata {
            name: repo.repo.clone(),
            description: self.description.clone(),
            homepage: None,
            html_url: repo.html_url(),
            license: None,
        })
    }

    fn latest_release(&self, repo: &RepoRef) -> GenResult<Release> {
        self.releases
            .first()
            .cloned()
            .ok_or_else(|| GenError::NoReleases(repo.to_string()))
    }

    fn releases(&self, _repo: &RepoRef) -> GenResult<Vec<Release>> {
        Ok(self.releases.clone())
    }

    fn root_files(&self, _repo: &RepoRef, _git_ref: &str) -> GenResult<Vec<String>> {
        Ok(self.root_files.clone())
    }
}

#[derive(Default)]
struct MapFetch(HashMap<String, Vec<u8>>);

impl MapFetch {
    fn with(mut self, url: impl Into<String>, body: Vec<u8>) -> Self {
        self.0.insert(url.into(), body);
        self
    }
}

impl Fetch for MapFetch {
    fn fetch(&self, url: &str) -> GenResult<Option<Vec<u8>>> {
        Ok(self.0.get(url).cloned())
    }
}

/// Validator with a fixed verdict
struct FixedValidator(bool);

impl ManifestValidator for FixedValidator {
    fn style(&self, _path: &Path, _kind: ManifestKind, _fix: bool) -> GenResult<ValidationReport> {
        Ok(if self.0 {
            ValidationReport::pass(ValidationCheck::Style)
        } else {
            ValidationReport::fail(ValidationCheck::Style, "Style/StringLiterals: offense")
        })
    }

    fn audit(&self, _path: &Path, _kind: ManifestKind) -> GenResult<ValidationReport> {
        Ok(ValidationReport::pass(ValidationCheck::Audit))
    }
}

fn tool_tarball() -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data) in [
        ("tool-1.0.0/bin/tool", &b"\x7fELF"[..]),
        ("tool-1.0.0/README.md", &b"# tool"[..]),
        ("tool-1.0.0/LICENSE", &b"MIT"[..]),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, data).unwrap();
    }
    let tar = builder.into_inner().unwrap();

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&tar).unwrap();
    encoder.finish().unwrap()
}

fn config(output: &Path) -> GenerateConfig {
    GenerateConfig::for_repository("o/tool")
        .unwrap()
        .with_output_dir(output)
        .with_validation(false)
}

const TARBALL: &str = "tool-1.0.0-linux-x86_64.tar.gz";

// ============================================================================
// Cask path
// ============================================================================

#[test]
fn test_tarball_release_becomes_cask() {
    let temp = TempDir::new().unwrap();
    let bytes = tool_tarball();
    let fetch = MapFetch::default().with(format!("{}{}", DOWNLOAD, TARBALL), bytes.clone());
    let source = FakeSource::with_assets(&[TARBALL, "tool_1.0.0_amd64.deb", "checksums.txt"]);
    let generator = Generator::new(Box::new(source), Box::new(fetch), Settings::default());

    let report = generator.generate(&config(temp.path())).unwrap();

    assert_eq!(report.kind, ManifestKind::Cask);
    assert_eq!(report.path, temp.path().join("Casks").join("tool.rb"));
    assert_eq!(report.selected_asset.as_deref(), Some(TARBALL));
    assert_eq!(report.build_strategy, None);
    assert!(report.validation.is_none());

    let text = fs::read_to_string(&report.path).unwrap();
    assert!(text.starts_with("cask \"tool\" do\n  version \"1.0.0\"\n"));
    assert!(text.contains(&format!("sha256 \"{}\"", sha256_hex(&bytes))));
    assert!(text.contains(
        "url \"https://github.com/o/tool/releases/download/v#{version}/tool-#{version}-linux-x86_64.tar.gz\""
    ));
    assert!(text.contains("desc \"Fast tool\""));
    assert!(text.contains("homepage \"https://github.com/o/tool\""));
    assert!(text.contains("binary \"tool-1.0.0/bin/tool\", target: \"tool\""));
    assert!(!text.contains("preflight"));
}

#[test]
fn test_upstream_checksum_is_verified() {
    let temp = TempDir::new().unwrap();
    let bytes = tool_tarball();
    let manifest = format!("{}  {}\n", sha256_hex(&bytes), TARBALL);
    let fetch = MapFetch::default()
        .with(format!("{}{}", DOWNLOAD, TARBALL), bytes)
        .with(format!("{}checksums.txt", DOWNLOAD), manifest.into_bytes());
    let source = FakeSource::with_assets(&[TARBALL, "checksums.txt"]);
    let generator = Generator::new(Box::new(source), Box::new(fetch), Settings::default());

    assert!(generator.generate(&config(temp.path())).is_ok());
}

#[test]
fn test_checksum_mismatch_is_fatal_and_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let manifest = format!("{}  {}\n", "f".repeat(64), TARBALL);
    let fetch = MapFetch::default()
        .with(format!("{}{}", DOWNLOAD, TARBALL), tool_tarball())
        .with(format!("{}checksums.txt", DOWNLOAD), manifest.into_bytes());
    let source = FakeSource::with_assets(&[TARBALL, "checksums.txt"]);
    let generator = Generator::new(Box::new(source), Box::new(fetch), Settings::default());

    let err = generator.generate(&config(temp.path())).unwrap_err();
    assert!(matches!(err, GenError::ChecksumMismatch { .. }));
    assert!(!temp.path().join("Casks").exists());
}

#[test]
fn test_checksum_probing_can_be_disabled() {
    let temp = TempDir::new().unwrap();
    let manifest = format!("{}  {}\n", "f".repeat(64), TARBALL);
    let fetch = MapFetch::default()
        .with(format!("{}{}", DOWNLOAD, TARBALL), tool_tarball())
        .with(format!("{}checksums.txt", DOWNLOAD), manifest.into_bytes());
    let source = FakeSource::with_assets(&[TARBALL]);
    let mut settings = Settings::default();
    settings.download.verify_upstream_checksums = false;
    let generator = Generator::new(Box::new(source), Box::new(fetch), settings);

    assert!(generator.generate(&config(temp.path())).is_ok());
}

#[test]
fn test_appimage_is_its_own_binary() {
    let temp = TempDir::new().unwrap();
    let appimage = "Tool-1.0.0-linux-x86_64.AppImage";
    let fetch = MapFetch::default().with(format!("{}{}", DOWNLOAD, appimage), b"AI\x02".to_vec());
    let source = FakeSource::with_assets(&[appimage]);
    let generator = Generator::new(Box::new(source), Box::new(fetch), Settings::default());

    let report = generator.generate(&config(temp.path())).unwrap();
    let text = fs::read_to_string(&report.path).unwrap();
    assert!(text.contains(&format!("binary \"{}\", target: \"tool\"", appimage)));
}

#[test]
fn test_forced_cask_without_tarball_fails() {
    let temp = TempDir::new().unwrap();
    let source = FakeSource::with_assets(&["tool_1.0.0_amd64.deb"]);
    let generator = Generator::new(
        Box::new(source),
        Box::new(MapFetch::default()),
        Settings::default(),
    );

    let err = generator
        .generate(&config(temp.path()).with_kind(ManifestKind::Cask))
        .unwrap_err();
    assert!(matches!(err, GenError::UnsupportedArchive(_)));
}

// ============================================================================
// Formula path
// ============================================================================

#[test]
fn test_deb_only_release_falls_back_to_formula() {
    let temp = TempDir::new().unwrap();
    let source_bytes = b"source tarball bytes".to_vec();
    let fetch = MapFetch::default().with(SOURCE_TARBALL, source_bytes.clone());
    let source = FakeSource::with_assets(&["tool_1.0.0_amd64.deb", "tool-1.0.0.x86_64.rpm"]);
    let generator = Generator::new(Box::new(source), Box::new(fetch), Settings::default());

    let report = generator.generate(&config(temp.path())).unwrap();

    assert_eq!(report.kind, ManifestKind::Formula);
    assert_eq!(report.path, temp.path().join("Formula").join("tool.rb"));
    assert_eq!(report.build_strategy, Some(BuildStrategy::Go));
    assert_eq!(report.selected_asset, None);

    let text = fs::read_to_string(&report.path).unwrap();
    assert!(text.starts_with("class Tool < Formula\n"));
    assert!(text.contains(&format!("url \"{}\"", SOURCE_TARBALL)));
    assert!(text.contains(&format!("sha256 \"{}\"", sha256_hex(&source_bytes))));
    assert!(text.contains("depends_on \"go\" => :build"));
}

#[test]
fn test_no_assets_falls_back_to_formula() {
    let temp = TempDir::new().unwrap();
    let fetch = MapFetch::default().with(SOURCE_TARBALL, b"src".to_vec());
    let generator = Generator::new(
        Box::new(FakeSource::with_assets(&[])),
        Box::new(fetch),
        Settings::default(),
    );

    let report = generator.generate(&config(temp.path())).unwrap();
    assert_eq!(report.kind, ManifestKind::Formula);
}

#[test]
fn test_forced_formula_ignores_tarball() {
    let temp = TempDir::new().unwrap();
    let fetch = MapFetch::default().with(SOURCE_TARBALL, b"src".to_vec());
    let source = FakeSource::with_assets(&[TARBALL]);
    let generator = Generator::new(Box::new(source), Box::new(fetch), Settings::default());

    let report = generator
        .generate(&config(temp.path()).with_kind(ManifestKind::Formula))
        .unwrap();
    assert_eq!(report.kind, ManifestKind::Formula);
    assert_eq!(report.selected_asset, None);
}

#[test]
fn test_missing_build_system_is_reported() {
    let temp = TempDir::new().unwrap();
    let mut source = FakeSource::with_assets(&[]);
    source.root_files = vec!["README.md".to_string(), "setup.py".to_string()];
    let generator = Generator::new(
        Box::new(source),
        Box::new(MapFetch::default()),
        Settings::default(),
    );

    let err = generator.generate(&config(temp.path())).unwrap_err();
    assert!(matches!(err, GenError::NoBuildSystem(_)));
}

#[test]
fn test_missing_description_uses_fallback() {
    for description in [None, Some("..."), Some("  .  "), Some("   ")] {
        let temp = TempDir::new().unwrap();
        let fetch = MapFetch::default().with(SOURCE_TARBALL, b"src".to_vec());
        let mut source = FakeSource::with_assets(&[]);
        source.description = description.map(str::to_string);
        let generator = Generator::new(Box::new(source), Box::new(fetch), Settings::default());

        let report = generator.generate(&config(temp.path())).unwrap();
        assert_eq!(
            report.manifest.description,
            "Command-line tool distributed as tool",
            "{:?}",
            description
        );
    }
}

#[test]
fn test_no_release_is_reported() {
    let temp = TempDir::new().unwrap();
    let mut source = FakeSource::with_assets(&[]);
    source.releases.clear();
    let generator = Generator::new(
        Box::new(source),
        Box::new(MapFetch::default()),
        Settings::default(),
    );

    let err = generator.generate(&config(temp.path())).unwrap_err();
    assert!(matches!(err, GenError::NoReleases(_)));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_passing_validation_is_reported() {
    let temp = TempDir::new().unwrap();
    let fetch = MapFetch::default().with(format!("{}{}", DOWNLOAD, TARBALL), tool_tarball());
    let generator = Generator::new(
        Box::new(FakeSource::with_assets(&[TARBALL])),
        Box::new(fetch),
        Settings::default(),
    )
    .with_validator(Box::new(FixedValidator(true)));

    let report = generator
        .generate(&config(temp.path()).with_validation(true))
        .unwrap();
    let outcome = report.validation.unwrap();
    assert!(outcome.passed());
    assert_eq!(outcome.kind, ManifestKind::Cask);
}

#[test]
fn test_failed_validation_keeps_file() {
    let temp = TempDir::new().unwrap();
    let fetch = MapFetch::default().with(format!("{}{}", DOWNLOAD, TARBALL), tool_tarball());
    let generator = Generator::new(
        Box::new(FakeSource::with_assets(&[TARBALL])),
        Box::new(fetch),
        Settings::default(),
    )
    .with_validator(Box::new(FixedValidator(false)));

    let err = generator
        .generate(&config(temp.path()).with_validation(true))
        .unwrap_err();
    match err {
        GenError::ValidationFailed { path, diagnostics } => {
            assert!(path.exists());
            assert!(diagnostics.contains("[style] Style/StringLiterals"));
        }
        other => panic!("expected ValidationFailed, got {:?}", other),
    }
}

#[test]
fn test_rerun_overwrites_manifest() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Casks").join("tool.rb");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "stale").unwrap();

    let fetch = MapFetch::default().with(format!("{}{}", DOWNLOAD, TARBALL), tool_tarball());
    let generator = Generator::new(
        Box::new(FakeSource::with_assets(&[TARBALL])),
        Box::new(fetch),
        Settings::default(),
    );
    generator.generate(&config(temp.path())).unwrap();

    assert!(fs::read_to_string(&path).unwrap().starts_with("cask \"tool\" do"));
}
