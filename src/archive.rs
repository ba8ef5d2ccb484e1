//! In-memory archive listing and layout introspection
//!
//! The selected release asset is decompressed from a byte buffer, its
//! regular-file members are listed, and the member paths are classified to
//! find the primary executable, a desktop entry and an icon. Nothing is
//! unpacked to disk.

use crate::error::{GenError, GenResult};
use crate::icon::{self, IconCandidate, IconSizeToken};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use tracing::{debug, info};

/// Documentation file name prefixes (case-insensitive)
const DOC_PREFIXES: &[&str] = &[
    "LICENSE",
    "LICENCE",
    "README",
    "CHANGELOG",
    "CHANGES",
    "COPYING",
    "AUTHORS",
    "NOTICE",
    "CONTRIBUTING",
    "HISTORY",
];

/// Directory segments that hold support files rather than programs
const SUPPORT_SEGMENTS: &[&str] = &[
    "completions",
    "completion",
    "autocomplete",
    "man",
    "man1",
    "doc",
    "docs",
];

/// Extensions that are never executables
const NON_BINARY_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "html", "htm", "pdf", "json", "yaml", "yml", "toml", "xml",
    "ini", "cfg", "conf", "desktop", "png", "svg", "xpm", "ico", "jpg", "jpeg", "gif", "bmp",
    "css", "js", "sig", "asc", "pem", "sha256", "log", "fish", "zsh", "ps1",
];

/// Script extensions dropped from `bin/` candidates
const SCRIPT_EXTENSIONS: &[&str] = &["sh", "bash"];

/// Extensions accepted by the fallback pass
const FALLBACK_EXTENSIONS: &[&str] = &["bin", "elf"];

/// Decompressor for a tar container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// gzip (`.tar.gz`, `.tgz`)
    Gzip,
    /// xz (`.tar.xz`, `.txz`)
    Xz,
    /// bzip2 (`.tar.bz2`, `.tbz2`, `.tbz`)
    Bzip2,
    /// Uncompressed `.tar`
    Plain,
}

impl ArchiveKind {
    /// Pick the decompressor from a file name suffix
    pub fn from_filename(filename: &str) -> GenResult<Self> {
        let lower = filename.to_lowercase();
        let kind = if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Self::Gzip
        } else if lower.ends_with(".tar.xz") || lower.ends_with(".txz") {
            Self::Xz
        } else if lower.ends_with(".tar.bz2") || lower.ends_with(".tbz2") || lower.ends_with(".tbz")
        {
            Self::Bzip2
        } else if lower.ends_with(".tar") {
            Self::Plain
        } else {
            return Err(GenError::UnsupportedArchive(filename.to_string()));
        };
        Ok(kind)
    }

    fn reader<'a>(self, bytes: &'a [u8]) -> Box<dyn Read + 'a> {
        let cursor = Cursor::new(bytes);
        match self {
            Self::Gzip => Box::new(flate2::read::GzDecoder::new(cursor)),
            Self::Xz => Box::new(xz2::read::XzDecoder::new(cursor)),
            Self::Bzip2 => Box::new(bzip2::read::BzDecoder::new(cursor)),
            Self::Plain => Box::new(cursor),
        }
    }
}

/// List regular-file members of an archive held in memory
///
/// Paths keep archive order; a leading `./` is stripped.
pub fn list_members(bytes: &[u8], filename: &str) -> GenResult<Vec<String>> {
    let kind = ArchiveKind::from_filename(filename)?;
    let mut archive = tar::Archive::new(kind.reader(bytes));

    let entries = archive
        .entries()
        .map_err(|e| GenError::Archive(format!("{}: {}", filename, e)))?;

    let mut members = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| GenError::Archive(format!("{}: {}", filename, e)))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry
            .path()
            .map_err(|e| GenError::Archive(format!("{}: {}", filename, e)))?;
        let path = path.to_string_lossy();
        let path = path.trim_start_matches("./");
        if !path.is_empty() {
            members.push(path.to_string());
        }
    }

    debug!(
        target: "tapgen::introspect",
        archive = %filename,
        members = members.len(),
        "Listed archive members"
    );
    Ok(members)
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => Some(ext.to_lowercase()),
        _ => None,
    }
}

fn parent_segments(path: &str) -> impl Iterator<Item = &str> {
    let dir = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    dir.split('/').filter(|s| !s.is_empty())
}

/// Exclusions shared by both candidate passes
fn is_excluded(path: &str) -> bool {
    let upper = file_name(path).to_uppercase();
    if DOC_PREFIXES.iter().any(|p| upper.starts_with(p)) {
        return true;
    }
    if parent_segments(path).any(|s| {
        SUPPORT_SEGMENTS
            .iter()
            .any(|support| s.eq_ignore_ascii_case(support))
    }) {
        return true;
    }
    extension(path)
        .map(|ext| NON_BINARY_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// A classified archive member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMember {
    /// Path inside the archive
    pub path: String,
    /// Survives the global binary exclusions
    pub is_executable_candidate: bool,
    /// A `.desktop` file
    pub is_desktop_entry: bool,
    /// An icon image in an icon location
    pub is_icon: bool,
    /// Size token when the member is an icon
    pub icon_size_token: IconSizeToken,
}

impl ArchiveMember {
    /// Classify a member from its path alone
    pub fn classify(path: &str) -> Self {
        let is_icon = icon::is_icon_path(path);
        Self {
            path: path.to_string(),
            is_executable_candidate: !is_excluded(path),
            is_desktop_entry: extension(path).as_deref() == Some("desktop"),
            is_icon,
            icon_size_token: if is_icon {
                IconSizeToken::from_path(path)
            } else {
                IconSizeToken::Unknown
            },
        }
    }

    /// File name component
    pub fn file_name(&self) -> &str {
        file_name(&self.path)
    }

    fn in_bin_dir(&self) -> bool {
        parent_segments(&self.path).any(|s| s == "bin")
    }
}

/// Executable candidates in archive order
///
/// Members under a `bin` directory are preferred. Only when none exist are
/// extension-less (or `.bin`/`.elf`) members anywhere considered.
pub fn binary_candidates<S: AsRef<str>>(members: &[S]) -> Vec<String> {
    let classified: Vec<ArchiveMember> = members
        .iter()
        .map(|m| ArchiveMember::classify(m.as_ref()))
        .filter(|m| m.is_executable_candidate)
        .collect();

    let in_bin: Vec<String> = classified
        .iter()
        .filter(|m| m.in_bin_dir())
        .filter(|m| {
            extension(&m.path)
                .map(|ext| !SCRIPT_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(true)
        })
        .map(|m| m.path.clone())
        .collect();

    if !in_bin.is_empty() {
        return in_bin;
    }

    classified
        .into_iter()
        .filter(|m| match extension(&m.path) {
            None => true,
            Some(ext) => FALLBACK_EXTENSIONS.contains(&ext.as_str()),
        })
        .map(|m| m.path)
        .collect()
}

/// Choose the primary binary for a package
///
/// Exact file name match (case-insensitive) first, then a substring match
/// in either direction, then the first candidate.
pub fn best_binary<'a>(candidates: &'a [String], package_name: &str) -> Option<&'a str> {
    let wanted = package_name.to_lowercase();

    candidates
        .iter()
        .find(|c| file_name(c).to_lowercase() == wanted)
        .or_else(|| {
            candidates.iter().find(|c| {
                let name = file_name(c).to_lowercase();
                name.contains(&wanted) || wanted.contains(&name)
            })
        })
        .or_else(|| candidates.first())
        .map(String::as_str)
}

/// First `.desktop` member, if any
pub fn find_desktop_entry<S: AsRef<str>>(members: &[S]) -> Option<String> {
    let found = members
        .iter()
        .map(AsRef::as_ref)
        .find(|m| extension(m).as_deref() == Some("desktop"))
        .map(str::to_string);
    if found.is_none() {
        info!(target: "tapgen::introspect", "No desktop entry found in archive");
    }
    found
}

/// Everything the manifest needs to know about an archive's contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveLayout {
    /// Classified members in archive order
    pub members: Vec<ArchiveMember>,
    /// Executable candidates considered
    pub binary_candidates: Vec<String>,
    /// Chosen primary binary
    pub binary: Option<String>,
    /// Desktop entry, if shipped
    pub desktop_entry: Option<String>,
    /// Best icon, if shipped
    pub icon: Option<IconCandidate>,
}

impl ArchiveLayout {
    /// Primary binary or an archive error naming the package
    pub fn require_binary(&self, package_name: &str) -> GenResult<&str> {
        self.binary.as_deref().ok_or_else(|| {
            GenError::Archive(format!(
                "No executable for '{}' among {} archive members",
                package_name,
                self.members.len()
            ))
        })
    }
}

/// Introspect a member list
pub fn introspect<S: AsRef<str>>(members: &[S], package_name: &str) -> ArchiveLayout {
    let candidates = binary_candidates(members);
    let binary = best_binary(&candidates, package_name).map(str::to_string);

    info!(
        target: "tapgen::introspect",
        package = %package_name,
        candidates = candidates.len(),
        binary = ?binary,
        "Introspected archive layout"
    );

    ArchiveLayout {
        members: members
            .iter()
            .map(|m| ArchiveMember::classify(m.as_ref()))
            .collect(),
        binary_candidates: candidates,
        binary,
        desktop_entry: find_desktop_entry(members),
        icon: icon::best_icon(members),
    }
}
