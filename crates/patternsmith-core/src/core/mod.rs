// crates/patternsmith-core/src/core/mod.rs
// ============================================================================
// Module: Patternsmith Core Types
// Description: Canonical declaration model, keys, diagnostics, and options.
// Purpose: Provide stable, serializable types shared by every synthesis phase.
// Dependencies: serde, smallvec, thiserror
// ============================================================================

//! ## Overview
//! Core types are created fresh per synthesis invocation and are read-only
//! once produced. Nothing here performs analysis; see [`crate::analysis`] and
//! [`crate::composition`] for the algorithms.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod contract;
pub mod diagnostics;
pub mod hashing;
pub mod model;
pub mod options;
pub mod signature;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use contract::CatalogError;
pub use contract::CompositionHost;
pub use contract::ContractSurface;
pub use contract::ContractVariant;
pub use contract::HostSemantics;
pub use contract::MAX_CATALOG_BYTES;
pub use contract::TypeCatalog;
pub use contract::TypeDecl;
pub use contract::TypeKind;
pub use diagnostics::Checkpoint;
pub use diagnostics::Diagnostic;
pub use diagnostics::DiagnosticClass;
pub use diagnostics::DiagnosticKind;
pub use diagnostics::DiagnosticSink;
pub use diagnostics::Severity;
pub use diagnostics::SourceAnchor;
pub use diagnostics::SourceLocation;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use model::Accessibility;
pub use model::AsyncShape;
pub use model::MemberDescriptor;
pub use model::MemberKind;
pub use model::MemberMarkers;
pub use model::Parameter;
pub use model::ParameterList;
pub use model::PropertyAccessors;
pub use model::RefMode;
pub use model::SpecialKind;
pub use model::StepMarker;
pub use model::TypeRef;
pub use model::TypeRefError;
pub use options::AmbiguityPolicy;
pub use options::AsyncGeneration;
pub use options::CacheOptions;
pub use options::CacheStorage;
pub use options::EvictionPolicy;
pub use options::OrderingDirection;
pub use options::PatternFamily;
pub use options::PatternKind;
pub use options::SynthesisOptions;
pub use options::UnmappedPolicy;
pub use signature::SignatureKey;
