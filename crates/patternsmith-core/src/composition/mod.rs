// crates/patternsmith-core/src/composition/mod.rs
// ============================================================================
// Module: Deterministic Composition Synthesis
// Description: Composition planner and chain synthesizer.
// Purpose: Turn declared steps into a validated, nested call chain.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The [`CompositionPlanner`] validates and orders the steps declared on a
//! host; the [`ChainSynthesizer`] folds the resulting plan into nested
//! continuations with fixed capture and bridging decisions.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod chain;
pub mod planner;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use chain::Bridge;
pub use chain::Chain;
pub use chain::ChainSynthesizer;
pub use chain::Continuation;
pub use chain::HostCapture;
pub use chain::Invocation;
pub use planner::CompositionPlan;
pub use planner::CompositionPlanner;
pub use planner::CompositionStep;
pub use planner::ExecutionMode;
pub use planner::TerminalStep;
