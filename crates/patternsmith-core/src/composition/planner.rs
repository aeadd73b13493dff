// crates/patternsmith-core/src/composition/planner.rs
// ============================================================================
// Module: Composition Planner
// Description: Ordering and validation of declared composition steps.
// Purpose: Produce a validated plan with a single terminal and a fixed mode.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! Steps and the terminal are methods on the host carrying `step` or
//! `terminal` markers. The planner validates the whole declaration set before
//! returning anything, so every cardinality, rank, and signature problem is
//! reported in one pass.
//!
//! # Invariants
//! - A returned plan has at least one step and exactly one terminal.
//! - Step ranks in a returned plan are pairwise distinct.
//! - The plan is async iff forced on, or any participant is async; a forced-off
//!   async plan is rejected rather than downgraded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::core::contract::CompositionHost;
use crate::core::contract::HostSemantics;
use crate::core::contract::TypeDecl;
use crate::core::diagnostics::DiagnosticKind;
use crate::core::diagnostics::DiagnosticSink;
use crate::core::diagnostics::SourceLocation;
use crate::core::model::AsyncShape;
use crate::core::model::MemberDescriptor;
use crate::core::model::MemberKind;
use crate::core::model::TypeRef;
use crate::core::options::AsyncGeneration;
use crate::core::options::OrderingDirection;
use crate::core::options::SynthesisOptions;

// ============================================================================
// SECTION: Plan Types
// ============================================================================

/// Whole-plan execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Every continuation returns the output directly.
    Sync,
    /// Every continuation returns a completion handle of the output.
    Async,
}

/// A declared step that receives the input and the next continuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionStep {
    /// Host method name.
    pub method: String,
    /// Explicit ordering rank.
    pub rank: i32,
    /// Display name (marker name or method name).
    pub display_name: String,
    /// Async classification of the method's return.
    pub async_shape: AsyncShape,
    /// Input parameter type.
    pub input: TypeRef,
    /// Declared return type.
    pub returns: TypeRef,
    /// True when the method takes a trailing cancellation token.
    pub takes_cancellation: bool,
    /// Declaration position, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

/// The innermost continuation; it has no `next` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalStep {
    /// Host method name.
    pub method: String,
    /// Display name.
    pub display_name: String,
    /// Async classification of the method's return.
    pub async_shape: AsyncShape,
    /// Input parameter type (the plan input).
    pub input: TypeRef,
    /// Declared return type.
    pub returns: TypeRef,
    /// Cancellation token type, when taken.
    pub cancellation: Option<TypeRef>,
    /// Declaration position, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

/// Validated, ordered composition plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionPlan {
    /// Host type name.
    pub host: String,
    /// Host ownership tag.
    pub semantics: HostSemantics,
    /// Steps in execution order, outermost first.
    pub steps: Vec<CompositionStep>,
    /// Terminal step.
    pub terminal: TerminalStep,
    /// Execution mode.
    pub mode: ExecutionMode,
    /// Plan input type.
    pub input: TypeRef,
    /// Plan output type, unwrapped from any completion handle.
    pub output: TypeRef,
    /// Cancellation token type threaded through the chain, when any.
    pub cancellation: Option<TypeRef>,
    /// Wrap direction used to order the steps.
    pub direction: OrderingDirection,
}

// ============================================================================
// SECTION: Collection
// ============================================================================

/// Marked methods found on a host, in declaration order.
#[derive(Default)]
struct Declarations<'a> {
    /// Members carrying a step marker.
    steps: Vec<(&'a MemberDescriptor, i32, String)>,
    /// Members carrying the terminal marker.
    terminals: Vec<&'a MemberDescriptor>,
}

/// Collects marked methods, reporting members marked as both.
fn collect<'a>(host: &'a TypeDecl, sink: &mut DiagnosticSink) -> Declarations<'a> {
    let mut declarations = Declarations::default();
    for member in host.members.iter().filter(|member| member.kind == MemberKind::Method) {
        match (&member.markers.step, member.markers.terminal) {
            (Some(_), true) => sink.emit(
                DiagnosticKind::StepSignatureMismatch,
                host.member_anchor(member),
                vec![member.name.clone(), "is marked both as a step and as the terminal".to_string()],
            ),
            (Some(marker), false) => declarations.steps.push((
                member,
                marker.rank,
                marker.name.clone().unwrap_or_else(|| member.name.clone()),
            )),
            (None, true) => declarations.terminals.push(member),
            (None, false) => {}
        }
    }
    declarations
}

/// Returns the trailing cancellation token type, when the member takes one.
fn trailing_cancellation(member: &MemberDescriptor, base_arity: usize) -> Option<TypeRef> {
    member
        .parameters
        .get(base_arity)
        .filter(|parameter| parameter.ty.is_cancellation_token())
        .map(|parameter| parameter.ty.clone())
}

// ============================================================================
// SECTION: Planner
// ============================================================================

/// Orders and validates composition declarations.
#[derive(Debug, Clone, Copy)]
pub struct CompositionPlanner {
    /// Rank-based wrap direction.
    ordering: OrderingDirection,
    /// Async-generation tri-state.
    async_generation: AsyncGeneration,
}

impl CompositionPlanner {
    /// Creates a planner from job options.
    #[must_use]
    pub const fn new(options: &SynthesisOptions) -> Self {
        Self {
            ordering: options.ordering,
            async_generation: options.async_generation,
        }
    }

    /// Builds a plan for a captured host, or `None` when any Error was raised.
    #[must_use]
    pub fn plan(&self, host: &CompositionHost, sink: &mut DiagnosticSink) -> Option<CompositionPlan> {
        let checkpoint = sink.checkpoint();
        let decl = &host.declaration;
        let declarations = collect(decl, sink);
        let host_name = decl.name.clone();

        if declarations.steps.is_empty() {
            sink.emit(DiagnosticKind::NoSteps, decl.anchor(), vec![host_name.clone()]);
        }
        let terminal = match declarations.terminals.as_slice() {
            [] => {
                sink.emit(DiagnosticKind::MissingTerminal, decl.anchor(), vec![host_name.clone()]);
                None
            }
            [terminal] => terminal_step(decl, terminal, sink),
            many => {
                let names = many
                    .iter()
                    .map(|member| format!("`{}`", member.name))
                    .collect::<Vec<_>>()
                    .join(", ");
                sink.emit(
                    DiagnosticKind::DuplicateTerminal,
                    decl.anchor(),
                    vec![host_name.clone(), many.len().to_string(), names],
                );
                None
            }
        };
        report_duplicate_ranks(decl, &declarations, sink);

        let mut steps = Vec::with_capacity(declarations.steps.len());
        for (member, rank, display_name) in &declarations.steps {
            if let Some(step) = step_from(decl, member, *rank, display_name, terminal.as_ref(), sink) {
                steps.push(step);
            }
        }

        let terminal = terminal?;
        let mode = self.execution_mode(decl, &steps, &terminal, sink);
        if sink.errors_since(checkpoint) {
            debug!(host = %host_name, "composition plan rejected");
            return None;
        }

        match self.ordering {
            OrderingDirection::OuterFirst => steps.sort_by(|left, right| {
                left.rank.cmp(&right.rank).then_with(|| left.display_name.cmp(&right.display_name))
            }),
            OrderingDirection::InnerFirst => steps.sort_by(|left, right| {
                right.rank.cmp(&left.rank).then_with(|| left.display_name.cmp(&right.display_name))
            }),
        }
        let output = terminal.returns.unwrap_completion();
        debug!(host = %host_name, steps = steps.len(), mode = ?mode, "composition planned");
        Some(CompositionPlan {
            host: host_name,
            semantics: host.semantics(),
            input: terminal.input.clone(),
            output,
            cancellation: terminal.cancellation.clone(),
            steps,
            terminal,
            mode,
            direction: self.ordering,
        })
    }

    /// Decides the whole-plan mode, rejecting async plans when forced off.
    fn execution_mode(
        &self,
        decl: &TypeDecl,
        steps: &[CompositionStep],
        terminal: &TerminalStep,
        sink: &mut DiagnosticSink,
    ) -> ExecutionMode {
        let async_participants = steps
            .iter()
            .filter(|step| step.async_shape.is_async())
            .map(|step| format!("step `{}`", step.display_name))
            .chain(
                terminal
                    .async_shape
                    .is_async()
                    .then(|| format!("terminal `{}`", terminal.display_name)),
            )
            .collect::<Vec<_>>();
        match self.async_generation {
            AsyncGeneration::ForceOn => ExecutionMode::Async,
            AsyncGeneration::Auto if async_participants.is_empty() => ExecutionMode::Sync,
            AsyncGeneration::Auto => ExecutionMode::Async,
            AsyncGeneration::ForceOff if async_participants.is_empty() => ExecutionMode::Sync,
            AsyncGeneration::ForceOff => {
                sink.emit(
                    DiagnosticKind::AsyncForbidden,
                    decl.anchor(),
                    vec![decl.name.clone(), async_participants.join(", ")],
                );
                ExecutionMode::Sync
            }
        }
    }
}

/// Validates the terminal's shape.
fn terminal_step(
    decl: &TypeDecl,
    member: &MemberDescriptor,
    sink: &mut DiagnosticSink,
) -> Option<TerminalStep> {
    let cancellation = trailing_cancellation(member, 1);
    let expected = 1 + usize::from(cancellation.is_some());
    let Some(input) = member.parameters.first().filter(|_| member.parameters.len() == expected)
    else {
        sink.emit(
            DiagnosticKind::TerminalSignature,
            decl.member_anchor(member),
            vec![member.name.clone(), "must take (input[, cancellation])".to_string()],
        );
        return None;
    };
    if input.ty.is_cancellation_token() {
        sink.emit(
            DiagnosticKind::TerminalSignature,
            decl.member_anchor(member),
            vec![member.name.clone(), "must take the input before the cancellation token".to_string()],
        );
        return None;
    }
    debug!(terminal = %member.name, cancellable = cancellation.is_some(), "terminal collected");
    Some(TerminalStep {
        method: member.name.clone(),
        display_name: member.name.clone(),
        async_shape: member.async_shape(),
        input: input.ty.clone(),
        returns: member.returns.clone(),
        cancellation,
        location: member.location.clone(),
    })
}

/// Validates a step's shape against the terminal.
fn step_from(
    decl: &TypeDecl,
    member: &MemberDescriptor,
    rank: i32,
    display_name: &str,
    terminal: Option<&TerminalStep>,
    sink: &mut DiagnosticSink,
) -> Option<CompositionStep> {
    let mismatch = |sink: &mut DiagnosticSink, detail: String| {
        sink.emit(
            DiagnosticKind::StepSignatureMismatch,
            decl.member_anchor(member),
            vec![member.name.clone(), detail],
        );
    };
    let cancellation = trailing_cancellation(member, 2);
    let expected = 2 + usize::from(cancellation.is_some());
    let input = match member.parameters.first() {
        Some(input) if member.parameters.len() == expected && !input.ty.is_cancellation_token() => {
            input.ty.clone()
        }
        _ => {
            mismatch(sink, "must take (input, next[, cancellation])".to_string());
            return None;
        }
    };
    if let Some(terminal) = terminal {
        if input != terminal.input {
            mismatch(sink, format!("takes `{input}` but the terminal takes `{}`", terminal.input));
        }
        let output = terminal.returns.unwrap_completion();
        if member.returns.unwrap_completion() != output {
            mismatch(sink, format!("returns `{}` but the plan produces `{output}`", member.returns));
        }
        if cancellation.is_some() && terminal.cancellation.is_none() {
            mismatch(sink, "takes a cancellation token but the terminal does not".to_string());
        }
    }
    Some(CompositionStep {
        method: member.name.clone(),
        rank,
        display_name: display_name.to_string(),
        async_shape: member.async_shape(),
        input,
        returns: member.returns.clone(),
        takes_cancellation: cancellation.is_some(),
        location: member.location.clone(),
    })
}

/// Reports every group of steps sharing a rank, naming all of them.
fn report_duplicate_ranks(decl: &TypeDecl, declarations: &Declarations<'_>, sink: &mut DiagnosticSink) {
    let mut by_rank: BTreeMap<i32, Vec<&str>> = BTreeMap::new();
    for (_, rank, display_name) in &declarations.steps {
        by_rank.entry(*rank).or_default().push(display_name.as_str());
    }
    for (rank, mut names) in by_rank {
        if names.len() < 2 {
            continue;
        }
        names.sort_unstable();
        let listed = names.iter().map(|name| format!("`{name}`")).collect::<Vec<_>>().join(", ");
        sink.emit(
            DiagnosticKind::DuplicateRank,
            decl.anchor(),
            vec![decl.name.clone(), listed, rank.to_string()],
        );
    }
}
