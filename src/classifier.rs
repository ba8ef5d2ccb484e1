//! Release asset classification
//!
//! Maps an asset filename to the platform indicators used by the selector:
//! operating system family, CPU architecture, package format and priority.
//!
//! Vendors name their assets inconsistently (`x86_64`/`amd64`/`x64`,
//! `aarch64`/`arm64`, `macos`/`darwin`/`osx`), so every rule here is a scan
//! over an ordered marker table. Tables are checked top to bottom and the
//! first hit wins, which keeps precedence explicit: compound suffixes such as
//! `.tar.gz` come before `.gz`-like ones and `arm64` comes before `arm`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A downloadable file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// File name as published
    pub name: String,
    /// Direct download URL
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    /// Size in bytes
    #[serde(rename = "size", default)]
    pub size_bytes: u64,
}

impl ReleaseAsset {
    /// Create a new release asset
    pub fn new(name: impl Into<String>, download_url: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
            size_bytes,
        }
    }
}

/// Operating system family relative to the Linux target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsFamily {
    /// Built for Linux
    Target,
    /// Explicitly built for another OS
    Other,
    /// No OS marker found
    Unknown,
}

/// CPU architecture found in an asset filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    /// Intel/AMD 64-bit
    X86_64,
    /// ARM 64-bit
    Arm64,
    /// ARM 32-bit
    Arm,
    /// No architecture marker found
    Unknown,
}

/// Package container format identified from the filename suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageFormat {
    /// `.tar.gz`, `.tgz`
    TarballGz,
    /// `.tar.xz`, `.txz`
    TarballXz,
    /// `.tar.bz2`, `.tbz2`, `.tbz`
    TarballBz2,
    /// `.tar`
    TarballPlain,
    /// `.deb`
    DebianPackage,
    /// `.rpm`
    RpmPackage,
    /// `.AppImage`
    AppImage,
    /// Anything else
    Unknown,
}

impl PackageFormat {
    /// Ordinal preference of this format (lower is better)
    ///
    /// Tarballs rank above Debian packages, which rank above everything else.
    pub fn priority_class(self) -> u8 {
        match self {
            Self::TarballGz | Self::TarballXz | Self::TarballBz2 | Self::TarballPlain => 1,
            Self::DebianPackage => 2,
            Self::RpmPackage | Self::AppImage | Self::Unknown => 3,
        }
    }

    /// Check if this is one of the tarball variants
    pub fn is_tarball(self) -> bool {
        matches!(
            self,
            Self::TarballGz | Self::TarballXz | Self::TarballBz2 | Self::TarballPlain
        )
    }

    /// Format name as shown in logs and CLI output
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TarballGz => "tarball-gz",
            Self::TarballXz => "tarball-xz",
            Self::TarballBz2 => "tarball-bz2",
            Self::TarballPlain => "tarball-plain",
            Self::DebianPackage => "debian-package",
            Self::RpmPackage => "rpm-package",
            Self::AppImage => "appimage",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Target => "linux",
            Self::Other => "other",
            Self::Unknown => "unknown",
        })
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X86_64 => "x86_64",
            Self::Arm64 => "arm64",
            Self::Arm => "arm",
            Self::Unknown => "unknown",
        })
    }
}

/// A release asset together with its derived platform indicators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedAsset {
    /// The asset as published
    pub asset: ReleaseAsset,
    /// Operating system family
    pub os_family: OsFamily,
    /// CPU architecture
    pub architecture: Architecture,
    /// Package container format
    pub package_format: PackageFormat,
    /// Preference rank derived from `package_format`
    pub priority_class: u8,
    /// Asset looks like a source archive
    pub is_source_archive: bool,
    /// Asset looks like a checksum manifest
    pub is_checksum_file: bool,
}

impl ClassifiedAsset {
    /// Asset file name
    pub fn name(&self) -> &str {
        &self.asset.name
    }
}

/// Suffix table, compound suffixes first
const FORMAT_SUFFIXES: &[(&str, PackageFormat)] = &[
    (".tar.gz", PackageFormat::TarballGz),
    (".tgz", PackageFormat::TarballGz),
    (".tar.xz", PackageFormat::TarballXz),
    (".txz", PackageFormat::TarballXz),
    (".tar.bz2", PackageFormat::TarballBz2),
    (".tbz2", PackageFormat::TarballBz2),
    (".tbz", PackageFormat::TarballBz2),
    (".tar", PackageFormat::TarballPlain),
    (".deb", PackageFormat::DebianPackage),
    (".rpm", PackageFormat::RpmPackage),
    (".appimage", PackageFormat::AppImage),
];

/// Markers for the Linux target: distribution names, then the kernel name
const TARGET_OS_MARKERS: &[&str] = &[
    "ubuntu",
    "debian",
    "fedora",
    "centos",
    "rhel",
    "opensuse",
    "suse",
    "archlinux",
    "manjaro",
    "alpine",
    "linux",
];

/// Markers for every other OS and their common aliases
const EXCLUDED_OS_MARKERS: &[&str] = &[
    "windows",
    "win32",
    "win64",
    "-win-",
    "_win_",
    "-win.",
    "_win.",
    ".exe",
    ".msi",
    "darwin",
    "macos",
    "mac-",
    "-mac",
    "_mac",
    "osx",
    "apple",
    ".dmg",
    ".pkg",
    "freebsd",
    "openbsd",
    "netbsd",
    "dragonfly",
    "android",
    "-ios",
    "_ios",
    "ios-",
    "solaris",
    "illumos",
];

/// Architecture markers, x86-64 first, then ARM64, then 32-bit ARM
const ARCH_MARKERS: &[(&str, Architecture)] = &[
    ("x86_64", Architecture::X86_64),
    ("x86-64", Architecture::X86_64),
    ("amd64", Architecture::X86_64),
    ("x64", Architecture::X86_64),
    ("aarch64", Architecture::Arm64),
    ("arm64", Architecture::Arm64),
    ("armv8", Architecture::Arm64),
    ("armv7", Architecture::Arm),
    ("armv6", Architecture::Arm),
    ("armhf", Architecture::Arm),
    ("armel", Architecture::Arm),
    ("-arm", Architecture::Arm),
    ("_arm", Architecture::Arm),
    (".arm", Architecture::Arm),
];

const SOURCE_MARKERS: &[&str] = &["source", "src", "sources"];

const CHECKSUM_MARKERS: &[&str] = &[
    "checksum",
    "sha256",
    "sha512",
    "md5",
    "sums.txt",
    "checksums.txt",
];

/// Detect the package format from the filename suffix
pub fn detect_format(filename: &str) -> PackageFormat {
    let f = filename.to_lowercase();
    FORMAT_SUFFIXES
        .iter()
        .find(|(suffix, _)| f.ends_with(suffix))
        .map(|(_, format)| *format)
        .unwrap_or(PackageFormat::Unknown)
}

/// Detect the OS family, given the already detected format
///
/// Debian and RPM packages are Linux by construction, so any name carrying
/// one of those extensions is the target regardless of other markers.
pub fn detect_os_family(filename: &str, format: PackageFormat) -> OsFamily {
    let f = filename.to_lowercase();

    if matches!(
        format,
        PackageFormat::DebianPackage | PackageFormat::RpmPackage
    ) || f.contains(".deb")
        || f.contains(".rpm")
    {
        return OsFamily::Target;
    }

    if TARGET_OS_MARKERS.iter().any(|m| f.contains(m)) {
        OsFamily::Target
    } else if EXCLUDED_OS_MARKERS.iter().any(|m| f.contains(m)) {
        OsFamily::Other
    } else {
        OsFamily::Unknown
    }
}

/// Detect the CPU architecture, first marker wins
pub fn detect_architecture(filename: &str) -> Architecture {
    let f = filename.to_lowercase();
    ARCH_MARKERS
        .iter()
        .find(|(marker, _)| f.contains(marker))
        .map(|(_, arch)| *arch)
        .unwrap_or(Architecture::Unknown)
}

/// Check if the filename marks a source archive
pub fn is_source_archive(filename: &str) -> bool {
    let f = filename.to_lowercase();
    SOURCE_MARKERS.iter().any(|m| f.contains(m))
}

/// Check if the filename marks a checksum manifest
pub fn is_checksum_file(filename: &str) -> bool {
    let f = filename.to_lowercase();
    CHECKSUM_MARKERS.iter().any(|m| f.contains(m))
}

/// Classify a release asset. Never fails.
pub fn classify(asset: ReleaseAsset) -> ClassifiedAsset {
    let package_format = detect_format(&asset.name);
    let os_family = detect_os_family(&asset.name, package_format);
    let architecture = detect_architecture(&asset.name);
    let is_source_archive = is_source_archive(&asset.name);
    let is_checksum_file = is_checksum_file(&asset.name);

    tracing::debug!(
        target: "tapgen::classify",
        asset = %asset.name,
        os = %os_family,
        arch = %architecture,
        format = %package_format,
        source = is_source_archive,
        checksum = is_checksum_file,
        "Classified asset"
    );

    ClassifiedAsset {
        asset,
        os_family,
        architecture,
        package_format,
        priority_class: package_format.priority_class(),
        is_source_archive,
        is_checksum_file,
    }
}

/// Classify every asset of a release, preserving order
pub fn classify_all(assets: impl IntoIterator<Item = ReleaseAsset>) -> Vec<ClassifiedAsset> {
    assets.into_iter().map(classify).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> ClassifiedAsset {
        classify(ReleaseAsset::new(name, format!("https://example.com/{name}"), 0))
    }

    #[test]
    fn test_linux_x64_tarball() {
        let c = named("app-linux-x64.tar.gz");
        assert_eq!(c.os_family, OsFamily::Target);
        assert_eq!(c.architecture, Architecture::X86_64);
        assert_eq!(c.package_format, PackageFormat::TarballGz);
        assert_eq!(c.priority_class, 1);
        assert!(!c.is_source_archive);
        assert!(!c.is_checksum_file);
    }

    #[test]
    fn test_compound_suffixes() {
        assert_eq!(detect_format("a.tar.gz"), PackageFormat::TarballGz);
        assert_eq!(detect_format("a.TGZ"), PackageFormat::TarballGz);
        assert_eq!(detect_format("a.tar.xz"), PackageFormat::TarballXz);
        assert_eq!(detect_format("a.tar.bz2"), PackageFormat::TarballBz2);
        assert_eq!(detect_format("a.tar"), PackageFormat::TarballPlain);
        assert_eq!(detect_format("a_1.0_amd64.deb"), PackageFormat::DebianPackage);
        assert_eq!(detect_format("a-1.0.x86_64.rpm"), PackageFormat::RpmPackage);
        assert_eq!(detect_format("App-1.0-x86_64.AppImage"), PackageFormat::AppImage);
        assert_eq!(detect_format("a.zip"), PackageFormat::Unknown);
    }

    #[test]
    fn test_deb_and_rpm_imply_linux() {
        assert_eq!(named("tool_1.0_amd64.deb").os_family, OsFamily::Target);
        assert_eq!(named("tool-windows.rpm").os_family, OsFamily::Target);
        assert_eq!(named("tool-darwin.deb.sha256").os_family, OsFamily::Target);
    }

    #[test]
    fn test_excluded_os_is_rejected_not_unknown() {
        assert_eq!(named("app-windows-x64.tar.gz").os_family, OsFamily::Other);
        assert_eq!(named("app-darwin-arm64.tar.gz").os_family, OsFamily::Other);
        assert_eq!(named("app-macos.tar.gz").os_family, OsFamily::Other);
        assert_eq!(named("app-freebsd-amd64.tar.gz").os_family, OsFamily::Other);
        assert_eq!(named("app-x86_64.tar.gz").os_family, OsFamily::Unknown);
    }

    #[test]
    fn test_distribution_names_are_target() {
        assert_eq!(named("app-ubuntu-22.04.tar.gz").os_family, OsFamily::Target);
        assert_eq!(named("app-fedora39.tar.xz").os_family, OsFamily::Target);
    }

    #[test]
    fn test_arm_ordering() {
        assert_eq!(detect_architecture("app-linux-arm64.tar.gz"), Architecture::Arm64);
        assert_eq!(detect_architecture("app-linux-aarch64.tar.gz"), Architecture::Arm64);
        assert_eq!(detect_architecture("app-linux-armv7.tar.gz"), Architecture::Arm);
        assert_eq!(detect_architecture("app-linux-armhf.tar.gz"), Architecture::Arm);
        assert_eq!(detect_architecture("app-linux-amd64.tar.gz"), Architecture::X86_64);
        assert_eq!(detect_architecture("app-linux-arm.tar.gz"), Architecture::Arm);
        assert_eq!(detect_architecture("charm-linux.tar.gz"), Architecture::Unknown);
    }

    #[test]
    fn test_source_and_checksum_markers() {
        assert!(named("app-1.0-src.tar.gz").is_source_archive);
        assert!(named("app-source.tar.gz").is_source_archive);
        assert!(named("checksums.txt").is_checksum_file);
        assert!(named("app.tar.gz.sha256").is_checksum_file);
        assert!(named("SHA512SUMS").is_checksum_file);
    }

    #[test]
    fn test_priority_is_function_of_format() {
        assert_eq!(PackageFormat::TarballXz.priority_class(), 1);
        assert_eq!(PackageFormat::DebianPackage.priority_class(), 2);
        assert_eq!(PackageFormat::RpmPackage.priority_class(), 3);
        assert_eq!(PackageFormat::AppImage.priority_class(), 3);
        assert_eq!(PackageFormat::Unknown.priority_class(), 3);
    }
}
