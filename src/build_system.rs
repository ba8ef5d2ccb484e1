//! Native build-system detection for source formulae
//!
//! When no prebuilt asset is usable the formula builds from the tagged
//! source tarball. The repository's root file list decides which toolchain
//! drives that build. Detection walks [`BuildStrategy::DETECTION_ORDER`]
//! and the first strategy whose marker files are present wins.

use crate::error::{GenError, GenResult};
use crate::manifest::ruby_quote;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported build toolchains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStrategy {
    Go,
    Cargo,
    Meson,
    CMake,
    Make,
}

impl BuildStrategy {
    /// Detection precedence
    pub const DETECTION_ORDER: &'static [BuildStrategy] = &[
        BuildStrategy::Go,
        BuildStrategy::Cargo,
        BuildStrategy::Meson,
        BuildStrategy::CMake,
        BuildStrategy::Make,
    ];

    /// Check whether the root file list carries this strategy's markers
    pub fn detect<S: AsRef<str>>(self, files: &[S]) -> bool {
        let has = |marker: &str| files.iter().any(|f| f.as_ref().ends_with(marker));
        match self {
            Self::Go => has("go.mod") || has("go.sum"),
            // A lockfile separates an application from a library crate
            Self::Cargo => has("Cargo.toml") && has("Cargo.lock"),
            Self::Meson => has("meson.build"),
            Self::CMake => has("CMakeLists.txt"),
            Self::Make => has("Makefile") || has("makefile") || has("GNUmakefile"),
        }
    }

    /// Build-time formula dependencies
    pub fn dependencies(self) -> Vec<&'static str> {
        match self {
            Self::Go => vec!["go"],
            Self::Cargo => vec!["rust"],
            Self::Meson => vec!["meson", "ninja"],
            Self::CMake => vec!["cmake"],
            Self::Make => vec![],
        }
    }

    /// Body of the formula's `def install` block, one statement per line
    pub fn install_procedure(self, binary_name: &str) -> String {
        let name = ruby_quote(binary_name);
        match self {
            Self::Go => format!(
                "system \"go\", \"build\", *std_go_args(ldflags: \"-s -w\", output: bin/{})",
                name
            ),
            Self::Cargo => "system \"cargo\", \"install\", *std_cargo_args".to_string(),
            Self::Meson => [
                "system \"meson\", \"setup\", \"build\", *std_meson_args",
                "system \"meson\", \"compile\", \"-C\", \"build\", \"--verbose\"",
                "system \"meson\", \"install\", \"-C\", \"build\"",
            ]
            .join("\n"),
            Self::CMake => [
                "system \"cmake\", \"-S\", \".\", \"-B\", \"build\", *std_cmake_args",
                "system \"cmake\", \"--build\", \"build\"",
                "system \"cmake\", \"--install\", \"build\"",
            ]
            .join("\n"),
            Self::Make => format!("system \"make\"\nbin.install {}", name),
        }
    }

    /// Body of the formula's `test do` block
    pub fn test_procedure(self, binary_name: &str) -> String {
        format!("system bin/{}, \"--version\"", ruby_quote(binary_name))
    }

    /// Lower-case display name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Cargo => "cargo",
            Self::Meson => "meson",
            Self::CMake => "cmake",
            Self::Make => "make",
        }
    }
}

impl fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the build system from a repository's root file names
pub fn detect_build_system<S: AsRef<str>>(files: &[S]) -> GenResult<BuildStrategy> {
    let strategy = BuildStrategy::DETECTION_ORDER
        .iter()
        .copied()
        .find(|s| s.detect(files))
        .ok_or_else(|| {
            let listed: Vec<&str> = files.iter().map(AsRef::as_ref).collect();
            GenError::NoBuildSystem(format!("root files [{}]", listed.join(", ")))
        })?;

    tracing::info!(target: "tapgen::build", strategy = %strategy, "Detected build system");
    Ok(strategy)
}
