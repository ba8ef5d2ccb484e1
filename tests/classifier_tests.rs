//! Tests for tapgen classifier and selector modules

use tapgen::classifier::{detect_format, detect_os_family, is_checksum_file};
use tapgen::selector::eligible_assets;
use tapgen::{
    classify, classify_all, select_asset, Architecture, GenError, OsFamily, PackageFormat,
    ReleaseAsset,
};

fn asset(name: &str) -> ReleaseAsset {
    ReleaseAsset::new(
        name,
        format!("https://github.com/o/r/releases/download/v1.0.0/{}", name),
        1024,
    )
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_linux_x64_tarball() {
    let c = classify(asset("app-linux-x64.tar.gz"));
    assert_eq!(c.os_family, OsFamily::Target);
    assert_eq!(c.architecture, Architecture::X86_64);
    assert_eq!(c.package_format, PackageFormat::TarballGz);
    assert_eq!(c.priority_class, 1);
    assert!(!c.is_source_archive);
    assert!(!c.is_checksum_file);
}

#[test]
fn test_deb_and_rpm_names_are_target() {
    for name in [
        "tool_1.0.0_amd64.deb",
        "tool-1.0.0.x86_64.rpm",
        "tool-windows.deb.sig",
        "tool-darwin.rpm.asc",
    ] {
        let format = detect_format(name);
        assert_eq!(detect_os_family(name, format), OsFamily::Target, "{}", name);
    }
}

#[test]
fn test_swapping_linux_for_excluded_marker() {
    let linux = classify(asset("tool-linux-amd64.tar.gz"));
    assert_eq!(linux.os_family, OsFamily::Target);

    for marker in ["windows", "darwin", "macos", "freebsd", "android"] {
        let name = format!("tool-{}-amd64.tar.gz", marker);
        assert_eq!(classify(asset(&name)).os_family, OsFamily::Other, "{}", name);
    }
}

#[test]
fn test_format_suffixes() {
    assert_eq!(detect_format("a.TGZ"), PackageFormat::TarballGz);
    assert_eq!(detect_format("a.tar.xz"), PackageFormat::TarballXz);
    assert_eq!(detect_format("a.tbz2"), PackageFormat::TarballBz2);
    assert_eq!(detect_format("a.tar"), PackageFormat::TarballPlain);
    assert_eq!(detect_format("Tool-x86_64.AppImage"), PackageFormat::AppImage);
    assert_eq!(detect_format("a.zip"), PackageFormat::Unknown);
}

#[test]
fn test_priority_is_function_of_format() {
    assert_eq!(PackageFormat::TarballPlain.priority_class(), 1);
    assert_eq!(PackageFormat::DebianPackage.priority_class(), 2);
    assert_eq!(PackageFormat::RpmPackage.priority_class(), 3);
    assert_eq!(PackageFormat::AppImage.priority_class(), 3);
    assert_eq!(PackageFormat::Unknown.priority_class(), 3);
}

#[test]
fn test_architecture_precedence() {
    assert_eq!(
        classify(asset("tool-aarch64-linux.tar.gz")).architecture,
        Architecture::Arm64
    );
    assert_eq!(
        classify(asset("tool-linux-armv7.tar.gz")).architecture,
        Architecture::Arm
    );
    assert_eq!(
        classify(asset("tool-linux-arm.tar.gz")).architecture,
        Architecture::Arm
    );
    assert_eq!(
        classify(asset("charm-linux.tar.gz")).architecture,
        Architecture::Unknown
    );
}

#[test]
fn test_source_and_checksum_markers() {
    assert!(classify(asset("tool-1.0-src.tar.gz")).is_source_archive);
    assert!(classify(asset("tool-source.tar.gz")).is_source_archive);
    assert!(is_checksum_file("SHA256SUMS"));
    assert!(is_checksum_file("tool-linux.tar.gz.sha256"));
    assert!(!is_checksum_file("tool-linux.tar.gz"));
}

#[test]
fn test_release_asset_deserializes_from_api_shape() {
    let json = r#"{
        "name": "tool-linux.tar.gz",
        "browser_download_url": "https://github.com/o/r/releases/download/v1/tool-linux.tar.gz",
        "size": 2048,
        "content_type": "application/gzip"
    }"#;
    let parsed: ReleaseAsset = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.name, "tool-linux.tar.gz");
    assert_eq!(parsed.size_bytes, 2048);
    assert!(parsed.download_url.ends_with("/tool-linux.tar.gz"));
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_tarball_preferred_over_deb_same_arch() {
    let set = classify_all(vec![
        asset("tool_1.0.0_amd64.deb"),
        asset("tool-1.0.0-linux-x86_64.tar.gz"),
    ]);
    assert_eq!(
        select_asset(&set).unwrap().name(),
        "tool-1.0.0-linux-x86_64.tar.gz"
    );
}

#[test]
fn test_x86_64_beats_arm64() {
    let set = classify_all(vec![
        asset("tool-linux-arm64.tar.xz"),
        asset("tool-linux-x86_64.tar.xz"),
    ]);
    assert_eq!(select_asset(&set).unwrap().name(), "tool-linux-x86_64.tar.xz");
}

#[test]
fn test_excluded_never_selected_when_linux_exists() {
    let set = classify_all(vec![
        asset("tool-darwin-x86_64.tar.gz"),
        asset("tool-windows-x86_64.tar.gz"),
        asset("tool-linux-arm64.tar.gz"),
    ]);
    let selected = select_asset(&set).unwrap();
    assert_eq!(selected.name(), "tool-linux-arm64.tar.gz");
}

#[test]
fn test_deb_selected_when_only_option() {
    let set = classify_all(vec![
        asset("tool-windows.zip"),
        asset("tool_1.0.0_amd64.deb"),
        asset("checksums.txt"),
    ]);
    let selected = select_asset(&set).unwrap();
    assert_eq!(selected.package_format, PackageFormat::DebianPackage);
}

#[test]
fn test_eligible_assets_reporting() {
    let set = classify_all(vec![
        asset("tool-src.tar.gz"),
        asset("tool.zip"),
        asset("tool-x86_64.tar.gz"),
        asset("tool-x86_64.AppImage"),
    ]);
    let names: Vec<&str> = eligible_assets(&set).iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["tool-x86_64.tar.gz"]);
}

#[test]
fn test_nothing_eligible_lists_candidates() {
    let set = classify_all(vec![asset("tool-macos.dmg"), asset("tool-win64.exe")]);
    match select_asset(&set) {
        Err(GenError::NoEligibleAsset { candidates }) => {
            assert_eq!(candidates, vec!["tool-macos.dmg", "tool-win64.exe"]);
        }
        other => panic!("expected NoEligibleAsset, got {:?}", other.map(|a| a.name())),
    }
}
