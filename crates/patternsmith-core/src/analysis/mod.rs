// crates/patternsmith-core/src/analysis/mod.rs
// ============================================================================
// Module: Contract Surface Resolution
// Description: Walker, classifier, and binding resolver.
// Purpose: Turn a captured contract into an ordered, validated member surface.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Surface resolution runs in three phases: the [`SurfaceWalker`] yields a
//! deduplicated raw stream, the [`MemberClassifier`] filters and orders it,
//! and for matching-style patterns the [`BindingResolver`] attaches
//! implementations from the candidate pool.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod binding;
pub mod classifier;
pub mod walker;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use binding::AsyncAdaptation;
pub use binding::Binding;
pub use binding::BindingResolver;
pub use binding::Candidate;
pub use binding::CandidateIndex;
pub use binding::Resolution;
pub use binding::ResolvedMember;
pub use binding::return_compatibility;
pub use classifier::ClassifiedMember;
pub use classifier::MemberClassifier;
pub use walker::RawMember;
pub use walker::SurfaceWalker;
