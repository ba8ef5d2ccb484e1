//! Icon discovery inside release archives
//!
//! Desktop applications usually ship icons either in a freedesktop theme
//! layout (`share/icons/hicolor/128x128/apps/app.png`) or in an ad-hoc
//! `icons/` directory. This module picks the single best one.
//!
//! ## Scoring
//!
//! | Size token            | Score |
//! |-----------------------|-------|
//! | 512x512               | 100   |
//! | 256x256               | 90    |
//! | hicolor / scalable    | 85    |
//! | 192x192               | 80    |
//! | 128x128               | 70    |
//! | 96x96                 | 60    |
//! | 64x64                 | 50    |
//! | 48x48                 | 40    |
//! | 32x32                 | 30    |
//! | 24x24                 | 20    |
//! | 16x16                 | 10    |
//! | any other NxN         | 5     |
//! | unknown               | 0     |
//!
//! The format adds svg 3, png 2, anything else 1.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory names that mark an icon location
const ICON_DIR_SEGMENTS: &[&str] = &["icons", "icon", "pixmaps", "hicolor"];

/// Square sizes with a dedicated score
const SIZE_SCORES: &[(u32, u32)] = &[
    (512, 100),
    (256, 90),
    (192, 80),
    (128, 70),
    (96, 60),
    (64, 50),
    (48, 40),
    (32, 30),
    (24, 20),
    (16, 10),
];

const THEME_TOKEN_SCORE: u32 = 85;
const OTHER_DIMENSIONS_SCORE: u32 = 5;

/// Supported icon formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconFormat {
    Png,
    Svg,
    Xpm,
    Ico,
}

impl IconFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            "xpm" => Some(Self::Xpm),
            "ico" => Some(Self::Ico),
            _ => None,
        }
    }

    /// Detect format from a member path
    pub fn from_path(path: &str) -> Option<Self> {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let (_, ext) = file_name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Xpm => "xpm",
            Self::Ico => "ico",
        }
    }

    fn score(self) -> u32 {
        match self {
            Self::Svg => 3,
            Self::Png => 2,
            Self::Xpm | Self::Ico => 1,
        }
    }
}

/// Size information carried by an icon path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconSizeToken {
    /// A `scalable` directory segment
    Scalable,
    /// A `hicolor` directory segment without `scalable`
    Hicolor,
    /// An `NxN` directory segment
    Dimensions(u32, u32),
    /// No size information
    Unknown,
}

impl IconSizeToken {
    /// Extract the size token from a path
    ///
    /// Theme segments take precedence over dimension segments.
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<String> = dir_segments(path).map(str::to_lowercase).collect();

        if segments.iter().any(|s| s == "scalable") {
            return Self::Scalable;
        }
        if segments.iter().any(|s| s == "hicolor") {
            return Self::Hicolor;
        }
        segments
            .iter()
            .find_map(|s| parse_dimensions(s))
            .map(|(w, h)| Self::Dimensions(w, h))
            .unwrap_or(Self::Unknown)
    }

    /// Size score used for ranking
    pub fn score(self) -> u32 {
        match self {
            Self::Scalable | Self::Hicolor => THEME_TOKEN_SCORE,
            Self::Dimensions(w, h) if w == h => SIZE_SCORES
                .iter()
                .find(|(size, _)| *size == w)
                .map(|(_, score)| *score)
                .unwrap_or(OTHER_DIMENSIONS_SCORE),
            Self::Dimensions(..) => OTHER_DIMENSIONS_SCORE,
            Self::Unknown => 0,
        }
    }
}

impl fmt::Display for IconSizeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalable => write!(f, "scalable"),
            Self::Hicolor => write!(f, "hicolor"),
            Self::Dimensions(w, h) => write!(f, "{}x{}", w, h),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Parse an `NxN` segment
fn parse_dimensions(segment: &str) -> Option<(u32, u32)> {
    let (w, h) = segment.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

/// Directory segments of a member path (file name excluded)
fn dir_segments(path: &str) -> impl Iterator<Item = &str> {
    let dir = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    dir.split('/').filter(|s| !s.is_empty())
}

/// Check if a member path looks like an application icon
pub fn is_icon_path(path: &str) -> bool {
    if IconFormat::from_path(path).is_none() {
        return false;
    }
    let in_icon_dir = dir_segments(path).any(|s| {
        ICON_DIR_SEGMENTS
            .iter()
            .any(|marker| s.eq_ignore_ascii_case(marker))
    });
    in_icon_dir || path.to_lowercase().contains("icon")
}

/// Theme directory (`128x128`, `scalable`) an icon is installed under
///
/// Uses the `NxN` segment when the path has one, `scalable` for vector
/// icons, and `256x256` otherwise.
pub fn theme_size_dir(path: &str, format: IconFormat) -> String {
    if let Some((w, h)) = dir_segments(path).find_map(parse_dimensions) {
        return format!("{}x{}", w, h);
    }
    if format == IconFormat::Svg {
        return "scalable".to_string();
    }
    "256x256".to_string()
}

/// A ranked icon candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconCandidate {
    /// Member path inside the archive
    pub path: String,
    /// Icon format
    pub format: IconFormat,
    /// Size token parsed from the path
    pub size_token: IconSizeToken,
    /// Combined size and format score
    pub score: u32,
}

impl IconCandidate {
    /// Build a candidate from a member path, if it is an icon
    pub fn from_path(path: &str) -> Option<Self> {
        if !is_icon_path(path) {
            return None;
        }
        let format = IconFormat::from_path(path)?;
        let size_token = IconSizeToken::from_path(path);
        Some(Self {
            path: path.to_string(),
            format,
            size_token,
            score: size_token.score() + format.score(),
        })
    }
}

/// Pick the highest scoring icon; ties go to the earliest member
pub fn best_icon<S: AsRef<str>>(members: &[S]) -> Option<IconCandidate> {
    let mut best: Option<IconCandidate> = None;
    for candidate in members
        .iter()
        .filter_map(|m| IconCandidate::from_path(m.as_ref()))
    {
        match best {
            Some(ref current) if current.score >= candidate.score => {}
            _ => best = Some(candidate),
        }
    }

    match best {
        Some(ref icon) => tracing::debug!(
            target: "tapgen::introspect",
            icon = %icon.path,
            size = %icon.size_token,
            score = icon.score,
            "Selected icon"
        ),
        None => tracing::info!(target: "tapgen::introspect", "No icon found in archive"),
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(IconFormat::from_extension("PNG"), Some(IconFormat::Png));
        assert_eq!(IconFormat::from_extension("svg"), Some(IconFormat::Svg));
        assert_eq!(IconFormat::from_extension("jpg"), None);
        assert_eq!(IconFormat::from_path("a/b/app.xpm"), Some(IconFormat::Xpm));
        assert_eq!(IconFormat::from_path("a/b/app"), None);
    }

    #[test]
    fn test_size_token() {
        assert_eq!(
            IconSizeToken::from_path("share/icons/hicolor/scalable/apps/a.svg"),
            IconSizeToken::Scalable
        );
        assert_eq!(
            IconSizeToken::from_path("share/icons/hicolor/64x64/apps/a.png"),
            IconSizeToken::Hicolor
        );
        assert_eq!(
            IconSizeToken::from_path("icons/48x48/a.png"),
            IconSizeToken::Dimensions(48, 48)
        );
        assert_eq!(IconSizeToken::from_path("a/icon.png"), IconSizeToken::Unknown);
    }

    #[test]
    fn test_size_scores() {
        assert_eq!(IconSizeToken::Dimensions(512, 512).score(), 100);
        assert_eq!(IconSizeToken::Hicolor.score(), 85);
        assert_eq!(IconSizeToken::Dimensions(16, 16).score(), 10);
        assert_eq!(IconSizeToken::Dimensions(100, 100).score(), 5);
        assert_eq!(IconSizeToken::Dimensions(64, 32).score(), 5);
        assert_eq!(IconSizeToken::Unknown.score(), 0);
    }

    #[test]
    fn test_is_icon_path() {
        assert!(is_icon_path("app/icons/app.png"));
        assert!(is_icon_path("app/share/pixmaps/app.xpm"));
        assert!(is_icon_path("app/app-icon.png"));
        assert!(!is_icon_path("app/screenshot.png"));
        assert!(!is_icon_path("app/icons/readme.txt"));
    }

    #[test]
    fn test_best_icon_prefers_larger() {
        let members = ["app/icons/48x48/app.png", "app/icons/128x128/app.png"];
        let icon = best_icon(&members).unwrap();
        assert_eq!(icon.path, "app/icons/128x128/app.png");
    }

    #[test]
    fn test_best_icon_format_breaks_size_tie() {
        let members = ["icons/64x64/app.png", "icons/64x64/app.svg"];
        assert_eq!(best_icon(&members).unwrap().path, "icons/64x64/app.svg");
    }

    #[test]
    fn test_best_icon_tie_keeps_first() {
        let members = ["icons/32x32/a.png", "icons/32x32/b.png"];
        assert_eq!(best_icon(&members).unwrap().path, "icons/32x32/a.png");
    }

    #[test]
    fn test_theme_size_dir() {
        assert_eq!(theme_size_dir("icons/128x128/a.png", IconFormat::Png), "128x128");
        assert_eq!(theme_size_dir("icons/a.svg", IconFormat::Svg), "scalable");
        assert_eq!(theme_size_dir("icons/a.png", IconFormat::Png), "256x256");
    }
}
