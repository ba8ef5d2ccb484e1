//! Manifest validation through an external checker
//!
//! The pipeline only sees [`ManifestValidator`]. [`BrewValidator`] runs
//! `brew style` and `brew audit` as subprocesses.
//!
//! `brew audit` resolves manifests by token inside tapped repositories, so
//! it cannot check a file that has only been written to an output
//! directory. Audit therefore runs only when asked for.

use crate::error::{GenError, GenResult};
use crate::manifest::ManifestKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Which check produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationCheck {
    Style,
    Audit,
}

impl fmt::Display for ValidationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Style => write!(f, "style"),
            Self::Audit => write!(f, "audit"),
        }
    }
}

/// Result of one validator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub check: ValidationCheck,
    pub passed: bool,
    /// Combined tool output
    pub diagnostics: String,
}

impl ValidationReport {
    /// Passing report with no output
    pub fn pass(check: ValidationCheck) -> Self {
        Self {
            check,
            passed: true,
            diagnostics: String::new(),
        }
    }

    /// Failing report
    pub fn fail(check: ValidationCheck, diagnostics: impl Into<String>) -> Self {
        Self {
            check,
            passed: false,
            diagnostics: diagnostics.into(),
        }
    }
}

/// External manifest checker
pub trait ManifestValidator {
    /// Lint a manifest file, rewriting it in place when `fix` is set
    fn style(&self, path: &Path, kind: ManifestKind, fix: bool) -> GenResult<ValidationReport>;

    /// Audit a manifest that is already placed in a tap
    fn audit(&self, path: &Path, kind: ManifestKind) -> GenResult<ValidationReport>;
}

/// `brew`-backed validator
#[derive(Debug, Clone)]
pub struct BrewValidator {
    executable: String,
}

impl Default for BrewValidator {
    fn default() -> Self {
        Self::new("brew")
    }
}

impl BrewValidator {
    /// Create a validator that runs `executable`
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Check if the executable can be launched, returning its version line
    pub fn check_available(&self) -> GenResult<String> {
        let output = self.run(&["--version"])?;
        if !output.status.success() {
            return Err(GenError::Validator(format!(
                "'{} --version' exited with {}",
                self.executable, output.status
            )));
        }
        let version = String::from_utf8_lossy(&output.stdout);
        Ok(version.lines().next().unwrap_or_default().trim().to_string())
    }

    fn run(&self, args: &[&str]) -> GenResult<Output> {
        debug!(
            target: "tapgen::validate",
            executable = %self.executable,
            args = ?args,
            "Running validator"
        );
        Command::new(&self.executable)
            .args(args)
            .output()
            .map_err(|e| {
                GenError::Validator(format!(
                    "Failed to run '{}': {}. Install Homebrew or set validator.executable",
                    self.executable, e
                ))
            })
    }

    fn report(check: ValidationCheck, output: Output) -> ValidationReport {
        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !diagnostics.is_empty() && !diagnostics.ends_with('\n') {
                diagnostics.push('\n');
            }
            diagnostics.push_str(&stderr);
        }
        ValidationReport {
            check,
            passed: output.status.success(),
            diagnostics: diagnostics.trim_end().to_string(),
        }
    }
}

impl ManifestValidator for BrewValidator {
    fn style(&self, path: &Path, _kind: ManifestKind, fix: bool) -> GenResult<ValidationReport> {
        let path_arg = path.to_string_lossy();
        let mut args = vec!["style"];
        if fix {
            args.push("--fix");
        }
        args.push(path_arg.as_ref());
        let output = self.run(&args)?;
        Ok(Self::report(ValidationCheck::Style, output))
    }

    fn audit(&self, path: &Path, kind: ManifestKind) -> GenResult<ValidationReport> {
        let token = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| GenError::Validator(format!("No token in {}", path.display())))?;
        let output = self.run(&["audit", kind.audit_flag(), token])?;
        Ok(Self::report(ValidationCheck::Audit, output))
    }
}

/// Validation toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateOptions {
    /// Run the style fixer once when style fails
    pub fix: bool,
    /// Also run audit (manifest must be in a tapped repository)
    pub audit: bool,
}

/// All reports for one manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub path: PathBuf,
    pub kind: ManifestKind,
    pub reports: Vec<ValidationReport>,
    /// The fixer changed the file
    pub fixed: bool,
}

impl ValidationOutcome {
    /// Every check passed
    pub fn passed(&self) -> bool {
        self.reports.iter().all(|r| r.passed)
    }

    /// Diagnostics of failing checks
    pub fn diagnostics(&self) -> String {
        self.reports
            .iter()
            .filter(|r| !r.passed)
            .map(|r| format!("[{}] {}", r.check, r.diagnostics))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Turn remaining violations into [`GenError::ValidationFailed`]
    pub fn ensure_passed(&self) -> GenResult<()> {
        if self.passed() {
            Ok(())
        } else {
            Err(GenError::ValidationFailed {
                path: self.path.clone(),
                diagnostics: self.diagnostics(),
            })
        }
    }
}

/// Work out whether a file is a cask or a formula
///
/// The tap directory decides; otherwise the first statement does.
pub fn detect_kind(path: &Path) -> GenResult<ManifestKind> {
    if let Some(kind) = ManifestKind::from_path(path) {
        return Ok(kind);
    }
    let content = fs::read_to_string(path)?;
    let first = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .unwrap_or_default();
    if first.starts_with("cask ") {
        Ok(ManifestKind::Cask)
    } else if first.starts_with("class ") && first.contains("< Formula") {
        Ok(ManifestKind::Formula)
    } else {
        Err(GenError::Validator(format!(
            "{} is neither a cask nor a formula",
            path.display()
        )))
    }
}

/// Validate one manifest file
///
/// Style runs first. When it fails and `fix` is set, the fixer runs once,
/// the file is re-read and style runs again to confirm.
pub fn validate_file(
    validator: &dyn ManifestValidator,
    path: &Path,
    options: ValidateOptions,
) -> GenResult<ValidationOutcome> {
    let kind = detect_kind(path)?;
    let mut style = validator.style(path, kind, false)?;
    let mut fixed = false;

    if !style.passed && options.fix {
        let before = fs::read_to_string(path)?;
        validator.style(path, kind, true)?;
        let after = fs::read_to_string(path)?;
        fixed = before != after;
        info!(
            target: "tapgen::validate",
            path = %path.display(),
            changed = fixed,
            "Applied style auto-fix"
        );
        style = validator.style(path, kind, false)?;
    }

    if !style.passed {
        warn!(
            target: "tapgen::validate",
            path = %path.display(),
            "Style violations remain"
        );
    }

    let mut reports = vec![style];

    if options.audit {
        reports.push(validator.audit(path, kind)?);
    } else {
        info!(
            target: "tapgen::validate",
            path = %path.display(),
            "Skipping audit; it needs the manifest inside a tapped repository"
        );
    }

    Ok(ValidationOutcome {
        path: path.to_path_buf(),
        kind,
        reports,
        fixed,
    })
}

/// Validate every `Casks/*.rb` and `Formula/*.rb` under `root`
pub fn validate_directory(
    validator: &dyn ManifestValidator,
    root: &Path,
    options: ValidateOptions,
) -> GenResult<Vec<ValidationOutcome>> {
    let mut outcomes = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| GenError::Io(e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("rb")
        {
            continue;
        }
        if ManifestKind::from_path(path).is_none() {
            continue;
        }
        outcomes.push(validate_file(validator, path, options)?);
    }

    info!(
        target: "tapgen::validate",
        root = %root.display(),
        manifests = outcomes.len(),
        failed = outcomes.iter().filter(|o| !o.passed()).count(),
        "Validated output directory"
    );
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_constructors() {
        assert!(ValidationReport::pass(ValidationCheck::Style).passed);
        let fail = ValidationReport::fail(ValidationCheck::Audit, "bad");
        assert!(!fail.passed);
        assert_eq!(fail.diagnostics, "bad");
    }

    #[test]
    fn test_outcome_diagnostics() {
        let outcome = ValidationOutcome {
            path: PathBuf::from("Casks/x.rb"),
            kind: ManifestKind::Cask,
            reports: vec![
                ValidationReport::pass(ValidationCheck::Style),
                ValidationReport::fail(ValidationCheck::Audit, "missing desc"),
            ],
            fixed: false,
        };
        assert!(!outcome.passed());
        assert_eq!(outcome.diagnostics(), "[audit] missing desc");
        assert!(matches!(
            outcome.ensure_passed(),
            Err(GenError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_missing_executable() {
        let validator = BrewValidator::new("tapgen-no-such-brew-binary");
        assert!(matches!(
            validator.check_available(),
            Err(GenError::Validator(_))
        ));
    }
}
