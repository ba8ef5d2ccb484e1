//! Checksum computation, upstream checksum manifests and verification
//!
//! Release pages often publish a `checksums.txt` / `SHA256SUMS` style file
//! next to the assets. Lines look like `sha256sum` output:
//!
//! ```text
//! # comment
//! 3a7bd3e2360a3d29eea436fcfb7e44c735d117c42d1c1835420b6b9942dd4f1b  app-linux-x86_64.tar.gz
//! 3a7bd3e2360a3d29eea436fcfb7e44c735d117c42d1c1835420b6b9942dd4f1b *app-linux-arm64.tar.gz
//! ```
//!
//! Finding no manifest, or no line for the asset, is not an error. A digest
//! that is published and does not match always is.

use crate::downloader::Fetch;
use crate::error::{GenError, GenResult};
use sha2::{Digest, Sha256, Sha512};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Conventional manifest names probed next to a release asset
pub const CHECKSUM_FILENAMES: &[&str] = &[
    "checksums.txt",
    "SHA256SUMS",
    "SHA256SUMS.txt",
    "sha256sums.txt",
    "checksums.sha256",
];

/// Hex-encoded SHA-256 of `content`
pub fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Verify `content` against an expected SHA-256 or SHA-512 digest
pub fn verify_checksum(asset: &str, content: &[u8], expected: &str) -> GenResult<()> {
    // Determine hash algorithm by length
    let actual = if expected.len() == 64 {
        sha256_hex(content)
    } else if expected.len() == 128 {
        let mut hasher = Sha512::new();
        hasher.update(content);
        format!("{:x}", hasher.finalize())
    } else {
        return Err(GenError::Config(format!(
            "Invalid checksum length: {} (expected 64 for SHA256 or 128 for SHA512)",
            expected.len()
        )));
    };

    if !actual.eq_ignore_ascii_case(expected) {
        return Err(GenError::ChecksumMismatch {
            asset: asset.to_string(),
            expected: expected.to_lowercase(),
            actual,
        });
    }

    info!(target: "tapgen::checksum", asset = %asset, "Checksum verified");
    Ok(())
}

fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Render one manifest line in `sha256sum` text mode
pub fn format_checksum_line(digest: &str, name: &str) -> String {
    format!("{}  {}", digest, name)
}

/// Parse a checksum manifest into a `file name -> lower-case digest` map
///
/// Accepts `<digest>  <name>` and `<digest> *<name>`. Blank lines, `#`
/// comments and anything else that does not parse are skipped.
pub fn parse_checksum_file(text: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let parsed = line
            .split_once("  ")
            .or_else(|| line.split_once(" *"))
            .filter(|(digest, name)| is_sha256_hex(digest.trim()) && !name.trim().is_empty());

        match parsed {
            Some((digest, name)) => {
                let name = name.trim().trim_start_matches('*');
                map.insert(name.to_string(), digest.trim().to_lowercase());
            }
            None => debug!(target: "tapgen::checksum", line = %line, "Skipping unparsable line"),
        }
    }

    map
}

/// Look up the digest for an asset, tolerating a directory prefix in the manifest
pub fn digest_for<'a>(map: &'a BTreeMap<String, String>, asset_name: &str) -> Option<&'a str> {
    map.get(asset_name)
        .or_else(|| {
            map.iter()
                .find(|(name, _)| name.rsplit('/').next() == Some(asset_name))
                .map(|(_, digest)| digest)
        })
        .map(String::as_str)
}

/// Base URL of an asset (everything up to and including the last `/`)
fn base_url(asset_url: &str) -> &str {
    match asset_url.rfind('/') {
        Some(idx) => &asset_url[..=idx],
        None => asset_url,
    }
}

/// Looks for upstream-published digests of a release asset
pub struct ChecksumProber<'a> {
    fetcher: &'a dyn Fetch,
}

impl<'a> ChecksumProber<'a> {
    /// Create a prober that downloads through `fetcher`
    pub fn new(fetcher: &'a dyn Fetch) -> Self {
        Self { fetcher }
    }

    /// Find the upstream SHA-256 for `asset_name`, if any manifest lists it
    pub fn probe(&self, asset_url: &str, asset_name: &str) -> GenResult<Option<String>> {
        let base = base_url(asset_url);

        for manifest in CHECKSUM_FILENAMES {
            let url = format!("{}{}", base, manifest);
            let Some(body) = self.fetcher.fetch(&url)? else {
                continue;
            };
            let map = parse_checksum_file(&String::from_utf8_lossy(&body));
            if let Some(digest) = digest_for(&map, asset_name) {
                info!(
                    target: "tapgen::checksum",
                    manifest = %manifest,
                    asset = %asset_name,
                    "Found upstream checksum"
                );
                return Ok(Some(digest.to_string()));
            }
            info!(
                target: "tapgen::checksum",
                manifest = %manifest,
                asset = %asset_name,
                "Checksum manifest has no entry for asset"
            );
        }

        // Per-asset sidecar, either a bare digest or a manifest line
        let sidecar = format!("{}{}.sha256", base, asset_name);
        if let Some(body) = self.fetcher.fetch(&sidecar)? {
            let text = String::from_utf8_lossy(&body);
            let map = parse_checksum_file(&text);
            let digest = digest_for(&map, asset_name).map(str::to_string).or_else(|| {
                text.split_whitespace()
                    .next()
                    .filter(|d| is_sha256_hex(d))
                    .map(str::to_lowercase)
            });
            if digest.is_some() {
                info!(target: "tapgen::checksum", asset = %asset_name, "Found sidecar checksum");
                return Ok(digest);
            }
        }

        info!(
            target: "tapgen::checksum",
            asset = %asset_name,
            "No upstream checksum published"
        );
        Ok(None)
    }

    /// Compute the digest of downloaded bytes and check it against upstream
    ///
    /// Returns the computed SHA-256. A mismatch is a hard error.
    pub fn verify_asset(
        &self,
        asset_url: &str,
        asset_name: &str,
        content: &[u8],
    ) -> GenResult<String> {
        let actual = sha256_hex(content);
        if let Some(expected) = self.probe(asset_url, asset_name)? {
            verify_checksum(asset_name, content, &expected)?;
        }
        Ok(actual)
    }
}
