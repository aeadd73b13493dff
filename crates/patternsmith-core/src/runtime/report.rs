// crates/patternsmith-core/src/runtime/report.rs
// ============================================================================
// Module: Synthesis Report
// Description: Canonical, hash-stamped summary of a synthesis run.
// Purpose: Give host tooling a byte-stable record of artifacts and diagnostics.
// Dependencies: crate::core::hashing, serde
// ============================================================================

//! ## Overview
//! A [`SynthesisReport`] lists, per job, the emitted artifact names with the
//! SHA-256 digest of their text and the job's diagnostics with stable ids and
//! rendered messages. Reports serialize as RFC 8785 canonical JSON, so two runs
//! over the same inputs produce identical bytes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::diagnostics::Diagnostic;
use crate::core::diagnostics::Severity;
use crate::core::diagnostics::SourceAnchor;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::canonical_json_bytes;
use crate::core::hashing::hash_text;
use crate::core::options::PatternKind;
use crate::runtime::engine::SynthesisOutcome;

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// Digest of one emitted artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDigest {
    /// Artifact file name.
    pub name: String,
    /// SHA-256 digest of the artifact text.
    pub digest: HashDigest,
}

/// Diagnostic as recorded in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedDiagnostic {
    /// Stable rule identifier.
    pub id: String,
    /// Effective severity.
    pub severity: Severity,
    /// Rendered message.
    pub message: String,
    /// Source anchor.
    pub anchor: SourceAnchor,
}

impl From<&Diagnostic> for ReportedDiagnostic {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            id: diagnostic.id().to_string(),
            severity: diagnostic.severity,
            message: diagnostic.message(),
            anchor: diagnostic.anchor.clone(),
        }
    }
}

/// Per-job report entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    /// Job label.
    pub job: String,
    /// Target type.
    pub target: String,
    /// Pattern synthesized.
    pub pattern: PatternKind,
    /// Emitted artifacts.
    pub artifacts: Vec<ArtifactDigest>,
    /// Diagnostics in report order.
    pub diagnostics: Vec<ReportedDiagnostic>,
}

/// Report for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SynthesisReport {
    /// Jobs in configuration order.
    pub jobs: Vec<JobReport>,
}

impl SynthesisReport {
    /// Appends a job outcome.
    pub fn record(&mut self, outcome: &SynthesisOutcome) {
        self.jobs.push(JobReport {
            job: outcome.job.clone(),
            target: outcome.target.clone(),
            pattern: outcome.pattern,
            artifacts: outcome
                .artifacts
                .iter()
                .map(|artifact| ArtifactDigest {
                    name: artifact.name.clone(),
                    digest: hash_text(&artifact.text),
                })
                .collect(),
            diagnostics: outcome.diagnostics.iter().map(ReportedDiagnostic::from).collect(),
        });
    }

    /// Returns the number of Error diagnostics across all jobs.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.jobs
            .iter()
            .flat_map(|job| job.diagnostics.iter())
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
            .count()
    }

    /// Serializes the report as canonical JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Canonicalization`] when serialization fails.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, HashError> {
        canonical_json_bytes(self)
    }
}
