//! # Verify
//!
//! Orchestrates one run: repository-root guard, schema registry load,
//! CODEOWNERS load, one tree validation, report rendering, exit code.
//!
//! Fatal errors (not a repository root, broken schema, missing CODEOWNERS,
//! unreadable data directory) abort before or instead of traversal.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use datacheck_core::{AddressChecker, Eip55Checker};
use datacheck_owners::CodeOwners;
use datacheck_schema::SchemaRegistry;
use datacheck_tree::{TreeValidator, ValidationReport};

use crate::resolve_path;

/// Line printed on stdout when the whole tree is valid.
pub const SUCCESS_LINE: &str = "Ok: all files match schema definitions!";

/// Arguments of a verification run.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Repository root. Must contain `.git`.
    #[arg(long, default_value = ".")]
    pub repo_root: PathBuf,

    /// Directory of schema definitions, relative to the repository root.
    #[arg(long, default_value = "schema")]
    pub schema_dir: PathBuf,

    /// Data directory to validate, relative to the repository root.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Explicit CODEOWNERS file. Discovered from the repository root if omitted.
    #[arg(long)]
    pub codeowners: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// How the report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per failure on stderr, success line on stdout.
    Text,
    /// The full report as JSON on stdout.
    Json,
}

/// Wires the collaborators together for a single run.
#[derive(Debug, Clone)]
pub struct Runner {
    repo_root: PathBuf,
    schema_dir: PathBuf,
    data_dir: PathBuf,
    codeowners: Option<PathBuf>,
}

impl Runner {
    /// A runner using the default `schema/` and `data/` layout under `repo_root`.
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            schema_dir: PathBuf::from("schema"),
            data_dir: PathBuf::from("data"),
            codeowners: None,
        }
    }

    /// Build a runner from parsed arguments.
    pub fn from_args(args: &VerifyArgs) -> Self {
        Self {
            repo_root: args.repo_root.clone(),
            schema_dir: args.schema_dir.clone(),
            data_dir: args.data_dir.clone(),
            codeowners: args.codeowners.clone(),
        }
    }

    /// Override the schema directory.
    pub fn with_schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = dir.into();
        self
    }

    /// Override the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Use a specific CODEOWNERS file instead of discovering one.
    pub fn with_codeowners(mut self, file: impl Into<PathBuf>) -> Self {
        self.codeowners = Some(file.into());
        self
    }

    /// Run the guard, load collaborators, and validate the data tree.
    ///
    /// # Errors
    ///
    /// Any fatal error: not a repository root, schema load failure,
    /// CODEOWNERS load failure, unreadable data directory.
    pub fn run(&self) -> Result<ValidationReport> {
        ensure_repo_root(&self.repo_root)?;

        let checker: Arc<dyn AddressChecker> = Arc::new(Eip55Checker);

        let schema_dir = resolve_path(&self.schema_dir, &self.repo_root);
        let registry = SchemaRegistry::load(&schema_dir, Arc::clone(&checker))
            .with_context(|| format!("cannot load schemas from \"{}\"", schema_dir.display()))?;
        tracing::info!(schemas = ?registry.identifiers(), "schema registry ready");

        // Patterns are relative to the repository root wherever the file lives.
        let owners = match &self.codeowners {
            Some(file) => {
                let file = resolve_path(file, &self.repo_root);
                CodeOwners::from_file(&file, &self.repo_root)
                    .with_context(|| format!("cannot load CODEOWNERS from \"{}\"", file.display()))?
            }
            None => CodeOwners::discover(&self.repo_root).context("cannot load CODEOWNERS")?,
        };
        tracing::debug!(root = %owners.root().display(), rules = owners.len(), "loaded CODEOWNERS");

        let data_dir = resolve_path(&self.data_dir, &self.repo_root);
        let report = TreeValidator::new(&registry, checker.as_ref(), &owners)
            .validate(&data_dir)
            .with_context(|| format!("cannot validate \"{}\"", data_dir.display()))?;
        Ok(report)
    }
}

/// Refuse to run outside a repository root.
///
/// # Errors
///
/// Fails if `repo_root` holds no `.git` entry.
pub fn ensure_repo_root(repo_root: &Path) -> Result<()> {
    if !repo_root.join(".git").exists() {
        tracing::debug!(repo_root = %repo_root.display(), "no .git entry");
        bail!("script should be run in the root of the repo.");
    }
    Ok(())
}

/// Process exit code for a finished report.
pub fn exit_code(report: &ValidationReport) -> u8 {
    if report.is_valid() {
        0
    } else {
        1
    }
}

/// Print `report` in `format`. Failure lines go to `err`, everything else to `out`.
///
/// # Errors
///
/// Propagates write and serialization errors.
pub fn render(
    report: &ValidationReport,
    format: OutputFormat,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for line in report.lines() {
                writeln!(err, "{line}")?;
            }
            if report.is_valid() {
                writeln!(out, "{SUCCESS_LINE}")?;
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

/// Execute a verification run and print its report.
///
/// # Errors
///
/// Any fatal error from [`Runner::run`], or an output error.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let report = Runner::from_args(args).run()?;
    render(
        &report,
        args.format,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )?;
    Ok(exit_code(&report))
}
