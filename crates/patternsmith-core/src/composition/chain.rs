// crates/patternsmith-core/src/composition/chain.rs
// ============================================================================
// Module: Chain Synthesizer
// Description: Nested continuation structure built from a composition plan.
// Purpose: Fix capture semantics and sync/async bridging per continuation.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The terminal is the base case. Folding the ordered steps from innermost to
//! outermost, each step becomes a continuation that receives the input and the
//! previously built continuation as `next`. The last continuation built is the
//! externally invoked entry point.
//!
//! Value-semantics hosts are captured as a snapshot taken once before any
//! continuation is built; reference-semantics hosts are captured directly.
//! A synchronous participant in an async chain completes immediately; an
//! asynchronous participant in a sync chain is blocked on, which trades
//! deadlock safety for a synchronous surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::composition::planner::CompositionPlan;
use crate::composition::planner::ExecutionMode;
use crate::core::contract::HostSemantics;
use crate::core::model::AsyncShape;
use crate::core::model::TypeRef;

// ============================================================================
// SECTION: Chain Types
// ============================================================================

/// How generated continuations reach the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostCapture {
    /// Close over an immutable snapshot taken before building the chain.
    Snapshot,
    /// Close over the host itself.
    Direct,
}

impl From<HostSemantics> for HostCapture {
    fn from(semantics: HostSemantics) -> Self {
        match semantics {
            HostSemantics::Value => Self::Snapshot,
            HostSemantics::Reference => Self::Direct,
        }
    }
}

/// Adapter between a participant's shape and the chain's mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bridge {
    /// Shapes already agree.
    None,
    /// Wrap a synchronous result in an already-completed handle.
    CompleteImmediately,
    /// Block synchronously on a completion handle.
    BlockOn,
}

impl Bridge {
    /// Chooses the bridge for a participant under a chain mode.
    #[must_use]
    pub const fn for_participant(shape: AsyncShape, mode: ExecutionMode) -> Self {
        match (shape.is_async(), mode) {
            (false, ExecutionMode::Async) => Self::CompleteImmediately,
            (true, ExecutionMode::Sync) => Self::BlockOn,
            _ => Self::None,
        }
    }
}

/// One host method call inside the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    /// Host method name.
    pub method: String,
    /// Display name.
    pub display_name: String,
    /// Rank for steps; `None` for the terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    /// Participant's own async classification.
    pub async_shape: AsyncShape,
    /// Adapter applied to the participant's result.
    pub bridge: Bridge,
    /// True when the cancellation token is passed to the participant.
    pub takes_cancellation: bool,
}

/// Nested continuation; the outermost value is the entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Continuation {
    /// Innermost continuation.
    Terminal {
        /// Terminal call.
        invocation: Invocation,
    },
    /// A step wrapping the previously built continuation.
    Step {
        /// Step call.
        invocation: Invocation,
        /// Continuation passed as `next`.
        next: Box<Self>,
    },
}

impl Continuation {
    /// Returns this continuation's own call.
    #[must_use]
    pub const fn invocation(&self) -> &Invocation {
        match self {
            Self::Terminal {
                invocation,
            }
            | Self::Step {
                invocation, ..
            } => invocation,
        }
    }

    /// Returns the continuation passed as `next`, if any.
    #[must_use]
    pub fn next(&self) -> Option<&Self> {
        match self {
            Self::Terminal {
                ..
            } => None,
            Self::Step {
                next, ..
            } => Some(next.as_ref()),
        }
    }
}

/// Fully synthesized call chain for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chain {
    /// Host type name.
    pub host: String,
    /// Host capture strategy.
    pub capture: HostCapture,
    /// Chain mode.
    pub mode: ExecutionMode,
    /// Entry-point continuation.
    pub entry: Continuation,
    /// Chain input type.
    pub input: TypeRef,
    /// Chain output type (unwrapped).
    pub output: TypeRef,
    /// Cancellation token type threaded through the chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<TypeRef>,
}

impl Chain {
    /// Returns participants from the entry point to the terminal.
    #[must_use]
    pub fn invocations(&self) -> Vec<&Invocation> {
        let mut out = Vec::new();
        let mut cursor = Some(&self.entry);
        while let Some(continuation) = cursor {
            out.push(continuation.invocation());
            cursor = continuation.next();
        }
        out
    }

    /// Returns display names from the entry point to the terminal.
    #[must_use]
    pub fn execution_order(&self) -> Vec<&str> {
        self.invocations().into_iter().map(|invocation| invocation.display_name.as_str()).collect()
    }

    /// Returns the number of nested continuations, terminal included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.invocations().len()
    }
}

// ============================================================================
// SECTION: Synthesizer
// ============================================================================

/// Folds a validated plan into a [`Chain`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainSynthesizer;

impl ChainSynthesizer {
    /// Builds the nested continuation for a plan.
    #[must_use]
    pub fn synthesize(self, plan: &CompositionPlan) -> Chain {
        let threads_cancellation = plan.cancellation.is_some();
        let terminal = &plan.terminal;
        let mut current = Continuation::Terminal {
            invocation: Invocation {
                method: terminal.method.clone(),
                display_name: terminal.display_name.clone(),
                rank: None,
                async_shape: terminal.async_shape,
                bridge: Bridge::for_participant(terminal.async_shape, plan.mode),
                takes_cancellation: threads_cancellation,
            },
        };
        for step in plan.steps.iter().rev() {
            current = Continuation::Step {
                invocation: Invocation {
                    method: step.method.clone(),
                    display_name: step.display_name.clone(),
                    rank: Some(step.rank),
                    async_shape: step.async_shape,
                    bridge: Bridge::for_participant(step.async_shape, plan.mode),
                    takes_cancellation: threads_cancellation && step.takes_cancellation,
                },
                next: Box::new(current),
            };
        }
        Chain {
            host: plan.host.clone(),
            capture: HostCapture::from(plan.semantics),
            mode: plan.mode,
            entry: current,
            input: plan.input.clone(),
            output: plan.output.clone(),
            cancellation: plan.cancellation.clone(),
        }
    }
}
