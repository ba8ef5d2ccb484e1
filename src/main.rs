use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use std::path::PathBuf;
use tapgen::{
    classify_all, select_asset, validate_directory, validate_file, BrewValidator, GenError,
    GenerateConfig, GenerateProgress, Generator, ManifestKind, ProgressExt, ReleaseAsset, Settings,
    ValidateOptions, ValidationOutcome,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Cask,
    Formula,
}

impl From<KindArg> for ManifestKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Cask => ManifestKind::Cask,
            KindArg::Formula => ManifestKind::Formula,
        }
    }
}

#[derive(Parser)]
#[command(name = "tapgen")]
#[command(author, version, about = "Generate Linux casks and formulae from GitHub releases", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/tapgen/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a manifest for a repository's latest release
    Generate {
        /// Repository as owner/repo or GitHub URL
        repo: String,
        /// Package name (default: repository name)
        #[arg(short, long)]
        name: Option<String>,
        /// Tap root receiving Casks/ and Formula/
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Force a cask or a formula
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
        /// Let the validator rewrite style violations
        #[arg(long)]
        fix: bool,
        /// Also run brew audit (manifest must be in a tapped repository)
        #[arg(long)]
        audit: bool,
        /// Skip validation
        #[arg(long)]
        no_validate: bool,
    },
    /// Validate a manifest file or every manifest under a tap root
    Validate {
        /// Manifest file or directory
        path: PathBuf,
        /// Let the validator rewrite style violations
        #[arg(long)]
        fix: bool,
        /// Also run brew audit
        #[arg(long)]
        audit: bool,
    },
    /// Show how asset file names classify and which one would be selected
    Classify {
        /// Asset file names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "tapgen=debug" } else { "tapgen=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn print_outcome(outcome: &ValidationOutcome) {
    let mark = if outcome.passed() {
        style("✓").green()
    } else {
        style("✗").red()
    };
    println!("{} {} ({})", mark, outcome.path.display(), outcome.kind);
    for report in outcome.reports.iter().filter(|r| !r.passed) {
        println!("  [{}] {}", report.check, report.diagnostics);
    }
}

fn run_generate(settings: Settings, config: GenerateConfig) -> Result<()> {
    let progress = GenerateProgress::new();
    let pb = progress.spinner(&format!("Generating manifest for {}", config.repository));
    let generator = Generator::from_settings(settings, Some(progress));

    match generator.generate(&config) {
        Ok(report) => {
            pb.finish_success(&format!("Wrote {}", report.path.display()));
            println!("{} {}", style(report.kind).cyan(), report.path.display());
            if let Some(asset) = &report.selected_asset {
                println!("  asset:   {}", asset);
            }
            if let Some(strategy) = report.build_strategy {
                println!("  build:   {}", strategy);
            }
            println!("  version: {} ({})", report.manifest.version, report.tag);
            Ok(())
        }
        Err(GenError::ValidationFailed { path, diagnostics }) => {
            pb.finish_error("Validation failed");
            eprintln!("{}", diagnostics);
            Err(anyhow::anyhow!(
                "Manifest written to {} but still fails validation",
                path.display()
            ))
        }
        Err(e) => {
            pb.finish_error("Generation failed");
            Err(e).context(format!("Failed to generate manifest for {}", config.repository))
        }
    }
}

fn run_validate(settings: &Settings, path: PathBuf, options: ValidateOptions) -> Result<()> {
    let validator = BrewValidator::new(settings.validator.executable.clone());
    let version = validator
        .check_available()
        .context("Validator is not available")?;
    tracing::debug!(target: "tapgen::validate", version = %version, "Validator found");

    let outcomes = if path.is_dir() {
        validate_directory(&validator, &path, options)?
    } else {
        vec![validate_file(&validator, &path, options)?]
    };

    outcomes.iter().for_each(print_outcome);
    let failed = outcomes.iter().filter(|o| !o.passed()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} manifests failed validation", failed, outcomes.len());
    }
    Ok(())
}

fn run_classify(names: Vec<String>) -> Result<()> {
    let assets = classify_all(names.into_iter().map(|n| ReleaseAsset::new(n, "", 0)));

    for asset in &assets {
        println!(
            "{:<48} os={:<8} arch={:<8} format={:<14} priority={} source={} checksum={}",
            asset.name(),
            asset.os_family.to_string(),
            asset.architecture.to_string(),
            asset.package_format.to_string(),
            asset.priority_class,
            asset.is_source_archive,
            asset.is_checksum_file
        );
    }

    match select_asset(&assets) {
        Ok(selected) => println!("{} {}", style("selected:").green(), selected.name()),
        Err(e) => println!("{} {}", style("selected:").red(), e),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Generate {
            repo,
            name,
            output,
            kind,
            fix,
            audit,
            no_validate,
        } => {
            let defaults = settings.validate_options();
            let mut config = GenerateConfig::for_repository(&repo)?
                .with_validation(!no_validate && settings.validator.enabled)
                .with_validate_options(ValidateOptions {
                    fix: fix || defaults.fix,
                    audit: audit || defaults.audit,
                });
            if let Some(name) = name {
                config = config.with_name(name);
            }
            if let Some(output) = output {
                config = config.with_output_dir(output);
            }
            if let Some(kind) = kind {
                config = config.with_kind(kind.into());
            }
            run_generate(settings, config)
        }
        Commands::Validate { path, fix, audit } => {
            let defaults = settings.validate_options();
            let options = ValidateOptions {
                fix: fix || defaults.fix,
                audit: audit || defaults.audit,
            };
            run_validate(&settings, path, options)
        }
        Commands::Classify { names } => run_classify(names),
    }
}
