// crates/patternsmith-core/src/runtime/mod.rs
// ============================================================================
// Module: Patternsmith Runtime
// Description: Synthesis orchestration and run reports.
// Purpose: Run analysis phases in order and record what was produced.
// Dependencies: crate::{analysis, composition, core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime is the only entry point host tooling needs: build a
//! [`Synthesizer`] over a catalog and a renderer, submit requests, and fold the
//! outcomes into a [`SynthesisReport`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod engine;
pub mod report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::AnalysisOutcome;
pub use engine::SynthesisOutcome;
pub use engine::SynthesisRequest;
pub use engine::Synthesizer;
pub use report::ArtifactDigest;
pub use report::JobReport;
pub use report::ReportedDiagnostic;
pub use report::SynthesisReport;
