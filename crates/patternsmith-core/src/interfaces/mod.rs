// crates/patternsmith-core/src/interfaces/mod.rs
// ============================================================================
// Module: Patternsmith Interfaces
// Description: Boundary types between analysis and textual emission.
// Purpose: Define the renderer seam and the artifact output shape.
// Dependencies: crate::{analysis, composition, core}, serde, thiserror
// ============================================================================

//! ## Overview
//! Analysis produces a [`SynthesisModel`] with every algorithmic decision
//! already made: member order, bindings, chain nesting, capture, bridging.
//! An [`ArtifactRenderer`] only turns that model into text; it never decides
//! eligibility or order. Renderers must be deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::analysis::ClassifiedMember;
use crate::analysis::ResolvedMember;
use crate::composition::Chain;
use crate::composition::CompositionPlan;
use crate::core::contract::ContractVariant;
use crate::core::options::AsyncGeneration;
use crate::core::options::CacheOptions;
use crate::core::options::PatternKind;

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Named source unit handed to the host's output sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceArtifact {
    /// Artifact file name.
    pub name: String,
    /// Artifact text.
    pub text: String,
}

// ============================================================================
// SECTION: Synthesis Models
// ============================================================================

/// Input to forwarding-style renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardingModel {
    /// Forwarding pattern (decorator, proxy, or cached factory).
    pub pattern: PatternKind,
    /// Contract name.
    pub contract: String,
    /// Contract variant.
    pub variant: ContractVariant,
    /// Generated type name.
    pub type_name: String,
    /// Classified surface in emission order.
    pub members: Vec<ClassifiedMember>,
    /// Async-generation tri-state.
    pub async_generation: AsyncGeneration,
    /// Cache knobs (cached factory only).
    pub cache: CacheOptions,
}

/// Input to the facade renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacadeModel {
    /// Contract name.
    pub contract: String,
    /// Generated type name.
    pub type_name: String,
    /// Source types in configured order.
    pub sources: Vec<String>,
    /// Resolved surface in emission order.
    pub members: Vec<ResolvedMember>,
}

/// Input to composition-style renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionModel {
    /// Composition pattern (pipeline or chain of responsibility).
    pub pattern: PatternKind,
    /// Validated plan.
    pub plan: CompositionPlan,
    /// Synthesized chain.
    pub chain: Chain,
}

/// Fully analyzed input for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum SynthesisModel {
    /// Decorator, proxy, or cached factory.
    Forwarding(ForwardingModel),
    /// Facade over bound implementations.
    Facade(FacadeModel),
    /// Pipeline or chain of responsibility.
    Composition(CompositionModel),
}

impl SynthesisModel {
    /// Returns the name of the type the artifact declares or extends.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Forwarding(model) => &model.type_name,
            Self::Facade(model) => &model.type_name,
            Self::Composition(model) => &model.plan.host,
        }
    }
}

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Errors raised by artifact renderers.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The renderer cannot express the model.
    #[error("unsupported model: {0}")]
    Unsupported(String),
    /// Text formatting failed.
    #[error("render failed: {0}")]
    Format(String),
}

/// Turns analyzed models into source artifacts.
pub trait ArtifactRenderer {
    /// Renders one model.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the model cannot be rendered.
    fn render(&self, model: &SynthesisModel) -> Result<Vec<SourceArtifact>, RenderError>;
}
