// crates/patternsmith-cli/src/workflow.rs
// ============================================================================
// Module: Run Workflow
// Description: Input loading plus the generate, check, and analyze commands.
// Purpose: Drive every configured job through the synthesizer.
// Dependencies: patternsmith-{core,config,emit}, tracing
// ============================================================================

//! ## Overview
//! A run loads the configuration, then the catalog snapshot it names, then
//! processes jobs in configuration order. Jobs are independent: one job's
//! Error diagnostics suppress only that job's artifacts.
//!
//! The run report lists every job's artifacts (with digests) and
//! diagnostics as canonical JSON, so two runs over the same inputs write
//! byte-identical reports.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use patternsmith_config::PatternsmithConfig;
use patternsmith_core::AnalysisOutcome;
use patternsmith_core::SourceArtifact;
use patternsmith_core::SynthesisOutcome;
use patternsmith_core::SynthesisReport;
use patternsmith_core::Synthesizer;
use patternsmith_core::TypeCatalog;
use patternsmith_emit::RustRenderer;
use tracing::debug;
use tracing::warn;

use crate::error::CliError;
use crate::output::matches_on_disk;
use crate::output::write_output;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File name of the run report inside the output directory.
pub const REPORT_FILE_NAME: &str = "patternsmith-report.json";

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Command-line overrides for configured locations.
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    /// Explicit config path.
    pub config: Option<PathBuf>,
    /// Catalog path overriding `[catalog] path`.
    pub catalog: Option<PathBuf>,
    /// Output directory overriding `[output] dir`.
    pub out: Option<PathBuf>,
}

/// Loaded configuration and catalog for one run.
#[derive(Debug)]
pub struct RunInputs {
    /// Validated configuration.
    pub config: PatternsmithConfig,
    /// Catalog snapshot shared by every job.
    pub catalog: TypeCatalog,
    /// Directory receiving artifacts and the report.
    pub output_dir: PathBuf,
}

impl RunInputs {
    /// Loads configuration, then the catalog it names.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] when either input cannot be loaded.
    pub fn load(overrides: &InputOverrides) -> Result<Self, CliError> {
        let config = PatternsmithConfig::load(overrides.config.as_deref())?;
        let catalog_path = overrides.catalog.clone().unwrap_or_else(|| config.catalog_path());
        let catalog = TypeCatalog::load(&catalog_path).map_err(|err| CliError::Catalog {
            path: catalog_path.display().to_string(),
            message: err.to_string(),
        })?;
        let output_dir = overrides.out.clone().unwrap_or_else(|| config.output_dir());
        debug!(
            catalog = %catalog_path.display(),
            types = catalog.len(),
            jobs = config.jobs.len(),
            "run inputs loaded"
        );
        Ok(Self {
            config,
            catalog,
            output_dir,
        })
    }

    /// Returns the renderer configured by `[output]`.
    fn renderer(&self) -> RustRenderer {
        match &self.config.output.header {
            Some(header) => RustRenderer::new().with_header(header.clone()),
            None => RustRenderer::new(),
        }
    }
}

// ============================================================================
// SECTION: Run Summaries
// ============================================================================

/// A job whose valid model could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    /// Job label.
    pub job: String,
    /// Renderer message.
    pub message: String,
}

/// Outcome of synthesizing every configured job.
#[derive(Debug)]
pub struct RunSummary {
    /// Per-job outcomes in configuration order.
    pub outcomes: Vec<SynthesisOutcome>,
    /// Jobs whose renderer failed.
    pub render_failures: Vec<RenderFailure>,
    /// Structured run report.
    pub report: SynthesisReport,
    /// Canonical JSON encoding of the report.
    pub report_json: Vec<u8>,
}

impl RunSummary {
    /// Returns true when no job recorded an Error or failed to render.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.report.error_count() == 0 && self.render_failures.is_empty()
    }

    /// Iterates every rendered artifact.
    pub fn artifacts(&self) -> impl Iterator<Item = &SourceArtifact> {
        self.outcomes.iter().flat_map(|outcome| outcome.artifacts.iter())
    }
}

/// Result of a drift check.
#[derive(Debug)]
pub struct CheckSummary {
    /// In-memory regeneration.
    pub run: RunSummary,
    /// Output files whose contents differ from the regeneration.
    pub drifted: Vec<PathBuf>,
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Synthesizes every job in memory.
///
/// # Errors
///
/// Returns [`CliError`] when two jobs produce the same artifact, an artifact
/// name is not a plain file name, or the report cannot be serialized.
pub fn synthesize_all(inputs: &RunInputs) -> Result<RunSummary, CliError> {
    let synthesizer = Synthesizer::new(&inputs.catalog, inputs.renderer());
    let mut outcomes = Vec::with_capacity(inputs.config.jobs.len());
    let mut render_failures = Vec::new();
    let mut report = SynthesisReport::default();
    let mut owners: BTreeMap<String, String> = BTreeMap::new();

    for job in &inputs.config.jobs {
        let outcome = match synthesizer.synthesize(&job.to_request()) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(job = %job.name, error = %err, "renderer failed");
                render_failures.push(RenderFailure {
                    job: job.name.clone(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        for artifact in &outcome.artifacts {
            validate_artifact_name(&artifact.name)?;
            if let Some(first) = owners.insert(artifact.name.clone(), job.name.clone()) {
                return Err(CliError::ArtifactCollision {
                    artifact: artifact.name.clone(),
                    first,
                    second: job.name.clone(),
                });
            }
        }
        debug!(
            job = %job.name,
            artifacts = outcome.artifacts.len(),
            diagnostics = outcome.diagnostics.len(),
            "job synthesized"
        );
        report.record(&outcome);
        outcomes.push(outcome);
    }

    let report_json =
        report.to_canonical_json().map_err(|err| CliError::Serialization(err.to_string()))?;
    Ok(RunSummary {
        outcomes,
        render_failures,
        report,
        report_json,
    })
}

/// Synthesizes every job and writes artifacts plus the run report.
///
/// Jobs with Error diagnostics write nothing; other jobs still emit.
///
/// # Errors
///
/// Returns [`CliError`] when synthesis setup or any write fails.
pub fn generate(inputs: &RunInputs) -> Result<RunSummary, CliError> {
    let run = synthesize_all(inputs)?;
    for artifact in run.artifacts() {
        write_output(&inputs.output_dir.join(&artifact.name), artifact.text.as_bytes())?;
    }
    write_output(&inputs.output_dir.join(REPORT_FILE_NAME), &run.report_json)?;
    debug!(dir = %inputs.output_dir.display(), "outputs written");
    Ok(run)
}

/// Regenerates in memory and lists output files that differ on disk.
///
/// # Errors
///
/// Returns [`CliError`] when synthesis setup fails or a file cannot be read.
pub fn check(inputs: &RunInputs) -> Result<CheckSummary, CliError> {
    let run = synthesize_all(inputs)?;
    let mut drifted = Vec::new();
    for artifact in run.artifacts() {
        let path = inputs.output_dir.join(&artifact.name);
        if !matches_on_disk(&path, artifact.text.as_bytes())? {
            drifted.push(path);
        }
    }
    let report_path = inputs.output_dir.join(REPORT_FILE_NAME);
    if !matches_on_disk(&report_path, &run.report_json)? {
        drifted.push(report_path);
    }
    Ok(CheckSummary {
        run,
        drifted,
    })
}

/// Runs the analysis phases for one job without rendering.
///
/// # Errors
///
/// Returns [`CliError::UnknownJob`] when no job has the given name.
pub fn analyze(inputs: &RunInputs, job_name: &str) -> Result<AnalysisOutcome, CliError> {
    let job = inputs
        .config
        .job(job_name)
        .ok_or_else(|| CliError::UnknownJob(job_name.to_string()))?;
    let synthesizer = Synthesizer::new(&inputs.catalog, inputs.renderer());
    Ok(synthesizer.analyze(&job.to_request()))
}

/// Rejects artifact names that would escape the output directory.
fn validate_artifact_name(name: &str) -> Result<(), CliError> {
    let path = Path::new(name);
    let plain = path.file_name().is_some_and(|file| file == path.as_os_str());
    if !plain || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(CliError::Invalid(format!("artifact name `{name}` is not a plain file name")));
    }
    Ok(())
}
