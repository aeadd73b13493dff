// crates/patternsmith-config/src/lib.rs
// ============================================================================
// Module: Patternsmith Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for patternsmith.toml semantics.
// Dependencies: patternsmith-core, serde, toml
// ============================================================================

//! ## Overview
//! `patternsmith-config` defines the configuration model for synthesis runs:
//! where the type catalog lives, where artifacts go, and the ordered list of
//! jobs. Loading is strict and fail-closed; each job converts into a core
//! [`patternsmith_core::SynthesisRequest`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
