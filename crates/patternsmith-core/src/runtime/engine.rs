// crates/patternsmith-core/src/runtime/engine.rs
// ============================================================================
// Module: Synthesis Engine
// Description: Phase orchestration from options to rendered artifacts.
// Purpose: Enforce phase order, diagnostic checkpoints, and all-or-nothing output.
// Dependencies: crate::{analysis, composition, core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! One [`SynthesisRequest`] is one contract (or host) plus one option record.
//! The engine runs synchronously and single-threaded:
//!
//! 1. option validation (Configuration diagnostics, before any analysis);
//! 2. target capture (Structural diagnostics);
//! 3. surface walk and classification, then binding resolution, or
//!    composition planning and chain synthesis;
//! 4. rendering, only when no Error was recorded.
//!
//! Every phase that can still run after an earlier phase's Error does run, so
//! the report lists everything found. Artifacts are all-or-nothing per request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::analysis::BindingResolver;
use crate::analysis::CandidateIndex;
use crate::analysis::MemberClassifier;
use crate::analysis::SurfaceWalker;
use crate::composition::ChainSynthesizer;
use crate::composition::CompositionPlanner;
use crate::core::contract::CompositionHost;
use crate::core::contract::ContractSurface;
use crate::core::contract::TypeCatalog;
use crate::core::diagnostics::Diagnostic;
use crate::core::diagnostics::DiagnosticSink;
use crate::core::diagnostics::Severity;
use crate::core::options::PatternFamily;
use crate::core::options::PatternKind;
use crate::core::options::SynthesisOptions;
use crate::interfaces::ArtifactRenderer;
use crate::interfaces::CompositionModel;
use crate::interfaces::FacadeModel;
use crate::interfaces::ForwardingModel;
use crate::interfaces::RenderError;
use crate::interfaces::SourceArtifact;
use crate::interfaces::SynthesisModel;

// ============================================================================
// SECTION: Requests and Outcomes
// ============================================================================

/// One synthesis invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Job label used in reports.
    pub job: String,
    /// Contract name (forwarding and facade) or host name (composition).
    pub target: String,
    /// Option record.
    pub options: SynthesisOptions,
}

impl SynthesisRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(job: impl Into<String>, target: impl Into<String>, options: SynthesisOptions) -> Self {
        Self {
            job: job.into(),
            target: target.into(),
            options,
        }
    }
}

/// Result of the analysis phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisOutcome {
    /// Job label.
    pub job: String,
    /// Target type.
    pub target: String,
    /// Pattern analyzed.
    pub pattern: PatternKind,
    /// Analyzed model; `None` when any Error was recorded.
    pub model: Option<SynthesisModel>,
    /// Sorted, deduplicated diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisOutcome {
    /// Returns true when any Error diagnostic was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|diagnostic| diagnostic.severity == Severity::Error)
    }
}

/// Result of a full synthesis invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOutcome {
    /// Job label.
    pub job: String,
    /// Target type.
    pub target: String,
    /// Pattern synthesized.
    pub pattern: PatternKind,
    /// Rendered artifacts; empty when any Error was recorded.
    pub artifacts: Vec<SourceArtifact>,
    /// Sorted, deduplicated diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl SynthesisOutcome {
    /// Returns true when any Error diagnostic was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|diagnostic| diagnostic.severity == Severity::Error)
    }
}

// ============================================================================
// SECTION: Synthesizer
// ============================================================================

/// Orchestrates the synthesis phases against a catalog snapshot.
pub struct Synthesizer<'a, R> {
    /// Declarations visible to the invocation.
    catalog: &'a TypeCatalog,
    /// Textual emission collaborator.
    renderer: R,
}

impl<'a, R> Synthesizer<'a, R>
where
    R: ArtifactRenderer,
{
    /// Creates a synthesizer.
    #[must_use]
    pub const fn new(catalog: &'a TypeCatalog, renderer: R) -> Self {
        Self {
            catalog,
            renderer,
        }
    }

    /// Runs every analysis phase without rendering.
    #[must_use]
    pub fn analyze(&self, request: &SynthesisRequest) -> AnalysisOutcome {
        let mut sink = DiagnosticSink::new();
        let model = self.run_phases(request, &mut sink).filter(|_| !sink.has_errors());
        AnalysisOutcome {
            job: request.job.clone(),
            target: request.target.clone(),
            pattern: request.options.pattern,
            model,
            diagnostics: sink.into_sorted(),
        }
    }

    /// Runs every phase and renders artifacts when no Error was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the renderer fails on a valid model.
    pub fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisOutcome, RenderError> {
        let analysis = self.analyze(request);
        let artifacts = match &analysis.model {
            Some(model) if !analysis.has_errors() => self.renderer.render(model)?,
            _ => {
                warn!(
                    job = %request.job,
                    target = %request.target,
                    diagnostics = analysis.diagnostics.len(),
                    "synthesis aborted; no artifacts emitted"
                );
                Vec::new()
            }
        };
        debug!(job = %request.job, artifacts = artifacts.len(), "synthesis finished");
        Ok(SynthesisOutcome {
            job: analysis.job,
            target: analysis.target,
            pattern: analysis.pattern,
            artifacts,
            diagnostics: analysis.diagnostics,
        })
    }

    /// Runs the phases for a request's pattern family.
    fn run_phases(&self, request: &SynthesisRequest, sink: &mut DiagnosticSink) -> Option<SynthesisModel> {
        let options = &request.options;
        if !options.validate(&request.target, self.catalog, sink) {
            debug!(job = %request.job, "options rejected before analysis");
            return None;
        }
        match options.pattern.family() {
            PatternFamily::Forwarding => {
                let contract = ContractSurface::capture(self.catalog, &request.target, sink)?;
                let raw = SurfaceWalker::new(self.catalog).walk(&contract, sink);
                let members = MemberClassifier.classify(&contract, raw, sink);
                if sink.has_errors() {
                    return None;
                }
                Some(SynthesisModel::Forwarding(ForwardingModel {
                    pattern: options.pattern,
                    contract: contract.name().to_string(),
                    variant: contract.variant,
                    type_name: options.artifact_type_name(&request.target),
                    members,
                    async_generation: options.async_generation,
                    cache: options.cache,
                }))
            }
            PatternFamily::Matching => {
                let contract = ContractSurface::capture(self.catalog, &request.target, sink)?;
                let raw = SurfaceWalker::new(self.catalog).walk(&contract, sink);
                let members = MemberClassifier.classify(&contract, raw, sink);
                if sink.has_errors() {
                    return None;
                }
                let index = CandidateIndex::build(self.catalog, &options.sources);
                let members =
                    BindingResolver::new(&index, options).resolve(contract.name(), members, sink);
                Some(SynthesisModel::Facade(FacadeModel {
                    contract: contract.name().to_string(),
                    type_name: options.artifact_type_name(&request.target),
                    sources: options.sources.clone(),
                    members,
                }))
            }
            PatternFamily::Composition => {
                let host = CompositionHost::capture(self.catalog, &request.target, sink)?;
                let plan = CompositionPlanner::new(options).plan(&host, sink)?;
                let chain = ChainSynthesizer.synthesize(&plan);
                Some(SynthesisModel::Composition(CompositionModel {
                    pattern: options.pattern,
                    plan,
                    chain,
                }))
            }
        }
    }
}
