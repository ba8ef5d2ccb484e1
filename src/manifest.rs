//! Manifest synthesis for Homebrew casks and formulae
//!
//! [`ManifestData`] holds everything a manifest says about a package. The
//! [`ManifestBuilder`] lays it out as an ordered list of [`Section`]s and
//! [`ManifestDocument::render`] serializes those to Ruby DSL text.
//!
//! ## Cask layout
//!
//! ```ruby
//! cask "token" do
//!   version "1.2.3"
//!   sha256 "<64 hex>"
//!
//!   url "https://github.com/o/r/releases/download/v#{version}/token-#{version}.tar.gz"
//!   name "Token"
//!   desc "Noun phrase"
//!   homepage "https://example.com"
//!
//!   binary "token-1.2.3/bin/token", target: "token"
//!
//!   zap trash: [
//!     "~/.cache/token",
//!     "~/.config/token",
//!     "~/.local/share/token",
//!   ]
//! end
//! ```
//!
//! ## Formula layout
//!
//! ```ruby
//! class Token < Formula
//!   desc "Noun phrase"
//!   homepage "https://example.com"
//!   url "https://github.com/o/r/archive/refs/tags/v1.2.3.tar.gz"
//!   sha256 "<64 hex>"
//!   license "MIT"
//!
//!   depends_on "go" => :build
//!
//!   def install
//!     system "go", "build", *std_go_args(ldflags: "-s -w", output: bin/"token")
//!   end
//!
//!   test do
//!     system bin/"token", "--version"
//!   end
//! end
//! ```

use crate::archive::ArchiveLayout;
use crate::build_system::BuildStrategy;
use crate::error::{GenError, GenResult};
use crate::icon::{self, IconCandidate, IconSizeToken};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const INDENT: &str = "  ";

/// XDG data directory as seen from a cask
const XDG_DATA_HOME: &str = "#{Dir.home}/.local/share";

// ============================================================================
// Text helpers
// ============================================================================

/// Quote a value as a Ruby double-quoted string literal
///
/// Escapes `\`, `"` and `#{` so the value is never interpolated.
pub fn ruby_quote(value: &str) -> String {
    format!("\"{}\"", escape_literal(value))
}

fn escape_literal(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("#{", "\\#{")
}

/// Quote `value` after a trusted interpolating prefix such as `#{staged_path}/`
///
/// Only the prefix is interpolated; `value` is escaped like [`ruby_quote`].
fn ruby_prefixed(prefix: &str, value: &str) -> String {
    format!("\"{}{}\"", prefix, escape_literal(value))
}

/// Quote a path that may live under the cask's XDG data directory
fn ruby_xdg_path(path: &str) -> String {
    match path.strip_prefix(XDG_DATA_HOME) {
        Some(rest) => ruby_prefixed(XDG_DATA_HOME, rest),
        None => ruby_quote(path),
    }
}

/// Quote a URL, interpolating `#{version}` wherever the version appears
///
/// The literal pieces are escaped like [`ruby_quote`].
fn ruby_versioned_url(url: &str, version: &str) -> String {
    if !templates_version(version) {
        return ruby_quote(url);
    }
    let pieces: Vec<String> = url.split(version).map(escape_literal).collect();
    format!("\"{}\"", pieces.join("#{version}"))
}

/// Normalize a description into Homebrew's noun-phrase form
///
/// Trims, drops a leading article, strips trailing periods and upper-cases
/// the first character.
pub fn normalize_description(description: &str) -> String {
    let mut text = description.trim();

    for article in ["a ", "an "] {
        if text.len() > article.len()
            && text.is_char_boundary(article.len())
            && text[..article.len()].eq_ignore_ascii_case(article)
        {
            text = text[article.len()..].trim_start();
            break;
        }
    }

    let text = text.trim_end_matches('.').trim_end();

    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case token with non-alphanumeric runs collapsed to `-`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Formula class name following Homebrew's naming rule
///
/// `my-tool` becomes `MyTool`, `foo+bar` becomes `Fooxbar`, `php@8` becomes
/// `PhpAT8`.
pub fn class_name(name: &str) -> String {
    let chars: Vec<char> = name.trim().chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let is_separator = matches!(c, '-' | '_' | '.') || c.is_whitespace();

        if i == 0 {
            out.extend(c.to_uppercase());
        } else if is_separator && next.is_some_and(|n| n.is_ascii_alphanumeric()) {
            if let Some(n) = next {
                out.extend(n.to_uppercase());
            }
            i += 1;
        } else if c == '@' && next.is_some_and(|n| n.is_ascii_digit()) {
            out.push_str("AT");
        } else if c == '+' {
            out.push('x');
        } else {
            out.extend(c.to_lowercase());
        }
        i += 1;
    }

    out
}

/// Per-user paths removed by `zap`, sorted
pub fn cleanup_paths(token: &str) -> Vec<String> {
    let mut paths = vec![
        format!("~/.config/{}", token),
        format!("~/.cache/{}", token),
        format!("~/.local/share/{}", token),
    ];
    paths.sort();
    paths
}

/// Replace the literal version in a URL with `#{version}`
///
/// Versions without a dot are left alone; a bare `1` would match too much.
pub fn template_version(url: &str, version: &str) -> String {
    if !templates_version(version) {
        return url.to_string();
    }
    url.replace(version, "#{version}")
}

fn templates_version(version: &str) -> bool {
    !version.is_empty() && version.contains('.')
}

fn is_sha256(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

// ============================================================================
// Data model
// ============================================================================

/// Which kind of manifest to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    /// Prebuilt binary cask
    Cask,
    /// Build-from-source formula
    Formula,
}

impl ManifestKind {
    /// Tap subdirectory holding this kind
    pub fn directory(self) -> &'static str {
        match self {
            Self::Cask => "Casks",
            Self::Formula => "Formula",
        }
    }

    /// Flag passed to `brew audit`
    pub fn audit_flag(self) -> &'static str {
        match self {
            Self::Cask => "--cask",
            Self::Formula => "--formula",
        }
    }

    /// `<root>/<Casks|Formula>/<token>.rb`
    pub fn manifest_path(self, root: &Path, token: &str) -> PathBuf {
        root.join(self.directory()).join(format!("{}.rb", token))
    }

    /// Infer the kind from a manifest path's parent directory
    pub fn from_path(path: &Path) -> Option<Self> {
        let parent = path.parent()?.file_name()?.to_str()?;
        match parent {
            "Casks" => Some(Self::Cask),
            "Formula" => Some(Self::Formula),
            _ => None,
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cask => write!(f, "cask"),
            Self::Formula => write!(f, "formula"),
        }
    }
}

impl FromStr for ManifestKind {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cask" => Ok(Self::Cask),
            "formula" => Ok(Self::Formula),
            other => Err(GenError::Config(format!(
                "Unknown manifest kind '{}', expected 'cask' or 'formula'",
                other
            ))),
        }
    }
}

/// A file copied out of the staged archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledFile {
    /// Path relative to the staged archive
    pub source: String,
    /// Absolute target, may contain `#{Dir.home}`
    pub target: String,
}

/// An icon installed into the hicolor theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledIcon {
    /// Path relative to the staged archive
    pub source: String,
    /// Absolute target, may contain `#{Dir.home}`
    pub target: String,
    /// Size token of the source path
    pub size_token: IconSizeToken,
}

/// Desktop menu integration for a cask
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopIntegration {
    /// `.desktop` entry, if shipped
    pub desktop_entry: Option<InstalledFile>,
    /// Icon, if shipped
    pub icon: Option<InstalledIcon>,
}

impl DesktopIntegration {
    /// Build from introspection results; `None` when neither is present
    pub fn new(
        token: &str,
        desktop_entry: Option<&str>,
        icon: Option<&IconCandidate>,
    ) -> Option<Self> {
        if desktop_entry.is_none() && icon.is_none() {
            return None;
        }

        let desktop_entry = desktop_entry.map(|source| InstalledFile {
            source: source.to_string(),
            target: format!("{}/applications/{}.desktop", XDG_DATA_HOME, token),
        });

        let icon = icon.map(|candidate| InstalledIcon {
            source: candidate.path.clone(),
            target: format!(
                "{}/icons/hicolor/{}/apps/{}.{}",
                XDG_DATA_HOME,
                icon::theme_size_dir(&candidate.path, candidate.format),
                token,
                candidate.format.extension()
            ),
            size_token: candidate.size_token,
        });

        Some(Self {
            desktop_entry,
            icon,
        })
    }

    /// Build from an archive layout
    pub fn from_layout(token: &str, layout: &ArchiveLayout) -> Option<Self> {
        Self::new(token, layout.desktop_entry.as_deref(), layout.icon.as_ref())
    }

    /// Directories the preflight block must create, in install order
    pub fn xdg_directories(&self) -> Vec<String> {
        self.desktop_entry
            .iter()
            .map(|d| d.target.as_str())
            .chain(self.icon.iter().map(|i| i.target.as_str()))
            .filter_map(|target| target.rsplit_once('/').map(|(dir, _)| dir.to_string()))
            .collect()
    }
}

/// How the package gets onto disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Installation {
    /// Binary taken from a release asset
    Prebuilt {
        /// Path of the binary inside the staged asset
        binary_path: String,
        /// Name it is linked as
        binary_target: String,
        /// Desktop entry and icon
        desktop: Option<DesktopIntegration>,
    },
    /// Built from the source tarball
    Source {
        /// Toolchain driving the build
        strategy: BuildStrategy,
        /// Installed binary name
        binary_name: String,
    },
}

/// Input to manifest synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestData {
    /// Cask token / formula file name
    pub token: String,
    /// Formula class name
    pub class_name: String,
    /// Display name
    pub name: String,
    /// Normalized version
    pub version: String,
    /// SHA-256 of the downloaded artifact
    pub sha256: String,
    /// Download URL
    pub url: String,
    /// Normalized description
    pub description: String,
    /// Project homepage
    pub homepage: String,
    /// SPDX license identifier
    pub license: Option<String>,
    /// Install method
    pub installation: Installation,
    /// Paths removed on `zap`
    pub cleanup_paths: Vec<String>,
}

impl ManifestData {
    fn base(name: &str, version: &str, url: &str, sha256: &str, installation: Installation) -> Self {
        let token = slugify(name);
        Self {
            class_name: class_name(&token),
            cleanup_paths: cleanup_paths(&token),
            token,
            name: name.to_string(),
            version: version.to_string(),
            sha256: sha256.to_lowercase(),
            url: url.to_string(),
            description: String::new(),
            homepage: String::new(),
            license: None,
            installation,
        }
    }

    /// Cask data for a prebuilt binary at `binary_path` inside the asset
    pub fn cask(name: &str, version: &str, url: &str, sha256: &str, binary_path: &str) -> Self {
        let installation = Installation::Prebuilt {
            binary_path: binary_path.to_string(),
            binary_target: slugify(name),
            desktop: None,
        };
        Self::base(name, version, url, sha256, installation)
    }

    /// Formula data for a source build
    pub fn formula(
        name: &str,
        version: &str,
        url: &str,
        sha256: &str,
        strategy: BuildStrategy,
    ) -> Self {
        let installation = Installation::Source {
            strategy,
            binary_name: slugify(name),
        };
        Self::base(name, version, url, sha256, installation)
    }

    /// Set the description (normalized)
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = normalize_description(description);
        self
    }

    /// Set the homepage
    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = homepage.into();
        self
    }

    /// Set the SPDX license
    pub fn with_license(mut self, license: Option<String>) -> Self {
        self.license = license.filter(|l| !l.trim().is_empty() && l != "NOASSERTION");
        self
    }

    /// Override the linked binary name (casks) or installed binary (formulae)
    pub fn with_binary_name(mut self, binary: &str) -> Self {
        match self.installation {
            Installation::Prebuilt {
                ref mut binary_target,
                ..
            } => *binary_target = binary.to_string(),
            Installation::Source {
                ref mut binary_name,
                ..
            } => *binary_name = binary.to_string(),
        }
        self
    }

    /// Attach desktop integration (casks only)
    pub fn with_desktop(mut self, integration: Option<DesktopIntegration>) -> Self {
        if let Installation::Prebuilt {
            ref mut desktop, ..
        } = self.installation
        {
            *desktop = integration;
        }
        self
    }

    /// Kind implied by the installation method
    pub fn kind(&self) -> ManifestKind {
        match self.installation {
            Installation::Prebuilt { .. } => ManifestKind::Cask,
            Installation::Source { .. } => ManifestKind::Formula,
        }
    }

    /// Render to Ruby DSL text
    pub fn render(&self) -> GenResult<String> {
        ManifestBuilder::from_data(self).map(|doc| doc.render())
    }

    fn check_required(&self) -> GenResult<()> {
        let required = [
            ("token", &self.token),
            ("name", &self.name),
            ("version", &self.version),
            ("url", &self.url),
            ("description", &self.description),
            ("homepage", &self.homepage),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(GenError::Render(format!(
                "Required field '{}' is empty for '{}'",
                field, self.name
            )));
        }
        if !is_sha256(&self.sha256) {
            return Err(GenError::Render(format!(
                "sha256 for '{}' is not 64 hex characters: '{}'",
                self.token, self.sha256
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Section IR
// ============================================================================

/// One element of a manifest document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// Opening line at column zero (`cask "x" do`, `class X < Formula`)
    Header(String),
    /// A single statement; continuation lines are pre-aligned
    Stanza(String),
    /// An empty separator line
    Blank,
    /// `opener` ... `end` with one statement per line
    Block {
        /// Opening line, e.g. `def install`
        opener: String,
        /// Body statements
        lines: Vec<String>,
    },
    /// `key: [` quoted items `]`
    List {
        /// Key before the bracket, e.g. `zap trash:`
        key: String,
        /// Already quoted items
        items: Vec<String>,
    },
}

/// Ordered sections of a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDocument {
    /// Sections in output order
    pub sections: Vec<Section>,
}

impl ManifestDocument {
    /// Serialize to Ruby text ending with a newline
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut opened = false;

        for section in &self.sections {
            match section {
                Section::Header(line) => {
                    out.push_str(line);
                    out.push('\n');
                    opened = true;
                }
                Section::Stanza(text) => {
                    for line in text.lines() {
                        push_line(&mut out, 1, line);
                    }
                }
                Section::Blank => out.push('\n'),
                Section::Block { opener, lines } => {
                    push_line(&mut out, 1, opener);
                    for line in lines {
                        push_line(&mut out, 2, line);
                    }
                    push_line(&mut out, 1, "end");
                }
                Section::List { key, items } => {
                    push_line(&mut out, 1, &format!("{} [", key));
                    for item in items {
                        push_line(&mut out, 2, &format!("{},", item));
                    }
                    push_line(&mut out, 1, "]");
                }
            }
        }

        if opened {
            out.push_str("end\n");
        }
        out
    }
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    if !line.is_empty() {
        out.push_str(&INDENT.repeat(depth));
        out.push_str(line);
    }
    out.push('\n');
}

/// Builds a [`ManifestDocument`] section by section
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    sections: Vec<Section>,
}

impl ManifestBuilder {
    /// Start a document with its header line
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            sections: vec![Section::Header(header.into())],
        }
    }

    /// Append a `key value` stanza
    pub fn stanza(mut self, line: impl Into<String>) -> Self {
        self.sections.push(Section::Stanza(line.into()));
        self
    }

    /// Append a separator, never two in a row
    pub fn blank(mut self) -> Self {
        if !matches!(self.sections.last(), Some(Section::Blank) | Some(Section::Header(_))) {
            self.sections.push(Section::Blank);
        }
        self
    }

    /// Append a `do ... end` style block
    pub fn block(mut self, opener: impl Into<String>, lines: Vec<String>) -> Self {
        self.sections.push(Section::Block {
            opener: opener.into(),
            lines,
        });
        self
    }

    /// Append a bracketed list
    pub fn list(mut self, key: impl Into<String>, items: Vec<String>) -> Self {
        self.sections.push(Section::List {
            key: key.into(),
            items,
        });
        self
    }

    /// Finish the document, dropping a trailing separator
    pub fn build(mut self) -> ManifestDocument {
        if matches!(self.sections.last(), Some(Section::Blank)) {
            self.sections.pop();
        }
        ManifestDocument {
            sections: self.sections,
        }
    }

    /// Lay out manifest data as a cask or formula document
    pub fn from_data(data: &ManifestData) -> GenResult<ManifestDocument> {
        data.check_required()?;
        let doc = match &data.installation {
            Installation::Prebuilt {
                binary_path,
                binary_target,
                desktop,
            } => Self::cask_document(data, binary_path, binary_target, desktop.as_ref()),
            Installation::Source {
                strategy,
                binary_name,
            } => Self::formula_document(data, *strategy, binary_name),
        };
        Ok(doc)
    }

    fn cask_document(
        data: &ManifestData,
        binary_path: &str,
        binary_target: &str,
        desktop: Option<&DesktopIntegration>,
    ) -> ManifestDocument {
        let mut builder = Self::new(format!("cask {} do", ruby_quote(&data.token)))
            .stanza(format!("version {}", ruby_quote(&data.version)))
            .stanza(format!("sha256 {}", ruby_quote(&data.sha256)))
            .blank()
            .stanza(format!("url {}", ruby_versioned_url(&data.url, &data.version)))
            .stanza(format!("name {}", ruby_quote(&data.name)))
            .stanza(format!("desc {}", ruby_quote(&data.description)))
            .stanza(format!("homepage {}", ruby_quote(&data.homepage)))
            .blank()
            .stanza(format!(
                "binary {}, target: {}",
                ruby_quote(binary_path),
                ruby_quote(binary_target)
            ));

        if let Some(desktop) = desktop {
            let artifacts = desktop
                .desktop_entry
                .iter()
                .map(|d| (d.source.as_str(), d.target.as_str()))
                .chain(desktop.icon.iter().map(|i| (i.source.as_str(), i.target.as_str())));
            for (source, target) in artifacts {
                builder = builder.stanza(format!(
                    "artifact {},\n         target: {}",
                    ruby_quote(source),
                    ruby_xdg_path(target)
                ));
            }
            builder = builder
                .blank()
                .block("preflight do", preflight_lines(desktop, binary_target));
        }

        builder
            .blank()
            .list(
                "zap trash:",
                data.cleanup_paths.iter().map(|p| ruby_quote(p)).collect(),
            )
            .build()
    }

    fn formula_document(
        data: &ManifestData,
        strategy: BuildStrategy,
        binary_name: &str,
    ) -> ManifestDocument {
        let mut builder = Self::new(format!("class {} < Formula", data.class_name))
            .stanza(format!("desc {}", ruby_quote(&data.description)))
            .stanza(format!("homepage {}", ruby_quote(&data.homepage)))
            .stanza(format!("url {}", ruby_quote(&data.url)))
            .stanza(format!("sha256 {}", ruby_quote(&data.sha256)));

        if let Some(license) = &data.license {
            builder = builder.stanza(format!("license {}", ruby_quote(license)));
        }

        let deps = strategy.dependencies();
        if !deps.is_empty() {
            builder = builder.blank();
            for dep in deps {
                builder = builder.stanza(format!("depends_on {} => :build", ruby_quote(dep)));
            }
        }

        builder
            .blank()
            .block(
                "def install",
                strategy
                    .install_procedure(binary_name)
                    .lines()
                    .map(str::to_string)
                    .collect(),
            )
            .blank()
            .block("test do", vec![strategy.test_procedure(binary_name)])
            .build()
    }
}

/// Body of the cask `preflight` block
fn preflight_lines(desktop: &DesktopIntegration, binary_target: &str) -> Vec<String> {
    let mut lines: Vec<String> = desktop
        .xdg_directories()
        .iter()
        .map(|dir| format!("FileUtils.mkdir_p {}", ruby_xdg_path(dir)))
        .collect();

    if let Some(entry) = &desktop.desktop_entry {
        lines.push(format!(
            "desktop = {}",
            ruby_prefixed("#{staged_path}/", &entry.source)
        ));
        lines.push("text = File.read(desktop)".to_string());
        lines.push(format!(
            "text.gsub!(/^Exec=\\S+/, {})",
            ruby_prefixed("Exec=#{HOMEBREW_PREFIX}/bin/", binary_target)
        ));
        if let Some(icon) = &desktop.icon {
            let icon_name = icon
                .target
                .rsplit('/')
                .next()
                .and_then(|f| f.rsplit_once('.'))
                .map(|(stem, _)| stem)
                .unwrap_or(binary_target);
            lines.push(format!(
                "text.gsub!(/^Icon=.*/, {})",
                ruby_quote(&format!("Icon={}", icon_name))
            ));
        }
        lines.push("File.write(desktop, text)".to_string());
    }

    lines
}

/// Render manifest data to Ruby text
pub fn render_manifest(data: &ManifestData) -> GenResult<String> {
    data.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruby_quote() {
        assert_eq!(ruby_quote("plain"), "\"plain\"");
        assert_eq!(ruby_quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(ruby_quote("a\\b"), "\"a\\\\b\"");
        assert_eq!(ruby_quote("#{evil}"), "\"\\#{evil}\"");
    }

    #[test]
    fn test_template_version() {
        assert_eq!(
            template_version("https://x/download/v1.2.3/t-1.2.3.tar.gz", "1.2.3"),
            "https://x/download/v#{version}/t-#{version}.tar.gz"
        );
        assert_eq!(template_version("https://x/a64/t.tar.gz", "6"), "https://x/a64/t.tar.gz");
    }

    #[test]
    fn test_blank_never_doubles() {
        let doc = ManifestBuilder::new("cask \"x\" do")
            .blank()
            .stanza("version \"1\"")
            .blank()
            .blank()
            .stanza("sha256 :no_check")
            .blank()
            .build();
        assert_eq!(
            doc.render(),
            "cask \"x\" do\n  version \"1\"\n\n  sha256 :no_check\nend\n"
        );
    }

    #[test]
    fn test_kind_paths() {
        let root = Path::new("/tap");
        let path = ManifestKind::Cask.manifest_path(root, "tool");
        assert_eq!(path, Path::new("/tap/Casks/tool.rb"));
        assert_eq!(ManifestKind::from_path(&path), Some(ManifestKind::Cask));
        assert_eq!(
            ManifestKind::from_path(Path::new("/tap/Formula/tool.rb")),
            Some(ManifestKind::Formula)
        );
        assert_eq!(ManifestKind::from_path(Path::new("/tap/tool.rb")), None);
        assert_eq!("Formula".parse::<ManifestKind>().unwrap(), ManifestKind::Formula);
        assert!("deb".parse::<ManifestKind>().is_err());
    }
}
