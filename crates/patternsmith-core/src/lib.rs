// crates/patternsmith-core/src/lib.rs
// ============================================================================
// Module: Patternsmith Core Library
// Description: Public API surface for contract analysis and composition synthesis.
// Purpose: Expose the model, analysis phases, renderer seam, and orchestrator.
// Dependencies: crate::{analysis, composition, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Patternsmith synthesizes structural design patterns from nominal contracts.
//! The core implements two algorithms shared by every pattern family:
//! contract surface resolution (walk, classify, bind) and deterministic
//! composition synthesis (plan, chain). Textual emission sits behind the
//! [`ArtifactRenderer`] seam.
//!
//! Everything here is created fresh per invocation and is deterministic: the
//! same catalog and options always yield the same artifacts and diagnostics.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod analysis;
pub mod composition;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use analysis::AsyncAdaptation;
pub use analysis::Binding;
pub use analysis::BindingResolver;
pub use analysis::Candidate;
pub use analysis::CandidateIndex;
pub use analysis::ClassifiedMember;
pub use analysis::MemberClassifier;
pub use analysis::RawMember;
pub use analysis::Resolution;
pub use analysis::ResolvedMember;
pub use analysis::SurfaceWalker;
pub use analysis::return_compatibility;
pub use composition::Bridge;
pub use composition::Chain;
pub use composition::ChainSynthesizer;
pub use composition::CompositionPlan;
pub use composition::CompositionPlanner;
pub use composition::CompositionStep;
pub use composition::Continuation;
pub use composition::ExecutionMode;
pub use composition::HostCapture;
pub use composition::Invocation;
pub use composition::TerminalStep;
pub use interfaces::ArtifactRenderer;
pub use interfaces::CompositionModel;
pub use interfaces::FacadeModel;
pub use interfaces::ForwardingModel;
pub use interfaces::RenderError;
pub use interfaces::SourceArtifact;
pub use interfaces::SynthesisModel;
pub use runtime::AnalysisOutcome;
pub use runtime::ArtifactDigest;
pub use runtime::JobReport;
pub use runtime::ReportedDiagnostic;
pub use runtime::SynthesisOutcome;
pub use runtime::SynthesisReport;
pub use runtime::SynthesisRequest;
pub use runtime::Synthesizer;
