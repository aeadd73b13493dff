// crates/patternsmith-core/src/analysis/binding.rs
// ============================================================================
// Module: Binding Resolver
// Description: Matching of contract members to externally declared candidates.
// Purpose: Bind each facade member by explicit tag or structural signature.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! The candidate pool is indexed once per invocation ([`CandidateIndex`]):
//! tagged candidates by target name, untagged candidates by member kind and
//! parameter shape. Resolution then costs one map lookup per contract member
//! rather than a walk over every declaration.
//!
//! Tie-break under ambiguity is first-by-declaration-order: sources in the
//! configured order, members in their declared order.
//!
//! # Invariants
//! - The pool is a read-only snapshot for the whole invocation.
//! - A bound member always names exactly one candidate, even when ambiguous.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::analysis::classifier::ClassifiedMember;
use crate::core::contract::TypeCatalog;
use crate::core::diagnostics::Diagnostic;
use crate::core::diagnostics::DiagnosticKind;
use crate::core::diagnostics::DiagnosticSink;
use crate::core::diagnostics::Severity;
use crate::core::diagnostics::SourceAnchor;
use crate::core::model::MemberDescriptor;
use crate::core::model::MemberKind;
use crate::core::model::SpecialKind;
use crate::core::model::TypeRef;
use crate::core::options::AmbiguityPolicy;
use crate::core::options::AsyncGeneration;
use crate::core::options::SynthesisOptions;
use crate::core::options::UnmappedPolicy;
use crate::core::signature::parameter_shape_key;

// ============================================================================
// SECTION: Candidates
// ============================================================================

/// An externally declared implementation a contract member may bind to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Declaring source type.
    pub source: String,
    /// Index of the source in the configured source list.
    pub source_index: usize,
    /// Candidate member.
    pub member: MemberDescriptor,
    /// Global declaration order across all sources.
    pub order: usize,
}

impl Candidate {
    /// Returns `source.member` for diagnostics.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.source, self.member.name)
    }
}

/// Flat index over the candidate pool.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    /// Candidates in declaration order.
    candidates: Vec<Candidate>,
    /// Tagged candidates keyed by explicit target name.
    by_target: BTreeMap<String, Vec<usize>>,
    /// Untagged candidates keyed by member kind tag and parameter shape.
    by_shape: BTreeMap<(&'static str, String), Vec<usize>>,
}

impl CandidateIndex {
    /// Indexes every eligible member of the given sources in order.
    ///
    /// Unknown sources are skipped; option validation reports them.
    #[must_use]
    pub fn build(catalog: &TypeCatalog, sources: &[String]) -> Self {
        let mut index = Self::default();
        for (source_index, source) in sources.iter().enumerate() {
            let Some(decl) = catalog.get(source) else {
                continue;
            };
            for member in decl.members.iter().filter(|member| eligible(member)) {
                let slot = index.candidates.len();
                match &member.markers.target {
                    Some(target) => index.by_target.entry(target.clone()).or_default().push(slot),
                    None => index
                        .by_shape
                        .entry((member.kind.key_tag(), parameter_shape_key(&member.parameters)))
                        .or_default()
                        .push(slot),
                }
                index.candidates.push(Candidate {
                    source: source.clone(),
                    source_index,
                    member: member.clone(),
                    order: slot,
                });
            }
        }
        debug!(candidates = index.candidates.len(), "candidate index built");
        index
    }

    /// Returns the number of indexed candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns true when no candidate was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Returns true for members that can serve as an implementation.
fn eligible(member: &MemberDescriptor) -> bool {
    !member.is_static
        && member.special == SpecialKind::Ordinary
        && matches!(member.kind, MemberKind::Method | MemberKind::Property)
        && member.accessibility.is_forwardable()
        && !member.is_generic()
}

// ============================================================================
// SECTION: Bindings
// ============================================================================

/// How a bound candidate's return shape is adapted to the contract's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AsyncAdaptation {
    /// Shapes are compatible as-is.
    Direct,
    /// A synchronous result is wrapped in an already-completed handle.
    WrapCompleted,
    /// A completion handle is synchronously blocked on.
    BlockOn,
}

/// A candidate chosen for a contract member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Chosen candidate.
    pub candidate: Candidate,
    /// Return-shape adaptation.
    pub adaptation: AsyncAdaptation,
}

/// Outcome of resolving one contract member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Bound to a candidate.
    Bound {
        /// Chosen binding.
        binding: Binding,
    },
    /// No candidate; emit a "not implemented" stub.
    Stub,
    /// No candidate; emit a default/no-op value.
    Default,
    /// No candidate; the member blocks emission.
    Unmapped,
}

/// Contract member together with its resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMember {
    /// Classified contract member; `bindings` lists every match.
    pub member: ClassifiedMember,
    /// Resolution outcome.
    pub resolution: Resolution,
    /// Resolution of the setter; `None` when the member declares no setter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setter: Option<Resolution>,
}

/// Decides return-shape compatibility between a contract member and a candidate.
///
/// Handles are compatible with each other when their unwrapped results match;
/// crossing between sync and async requires `adapt_async`.
#[must_use]
pub fn return_compatibility(
    expected: &TypeRef,
    actual: &TypeRef,
    adapt_async: bool,
) -> Option<AsyncAdaptation> {
    if expected == actual {
        return Some(AsyncAdaptation::Direct);
    }
    let expected_async = expected.is_completion_handle();
    let actual_async = actual.is_completion_handle();
    let same_result = expected.unwrap_completion() == actual.unwrap_completion();
    match (expected_async, actual_async) {
        (true, true) if same_result => Some(AsyncAdaptation::Direct),
        (true, false) if adapt_async && same_result => Some(AsyncAdaptation::WrapCompleted),
        (false, true) if adapt_async && same_result => Some(AsyncAdaptation::BlockOn),
        _ => None,
    }
}

/// Returns true when parameter types and modes match positionally.
fn parameters_match(expected: &MemberDescriptor, actual: &MemberDescriptor) -> bool {
    expected.kind == actual.kind
        && expected.parameters.len() == actual.parameters.len()
        && expected
            .parameters
            .iter()
            .zip(actual.parameters.iter())
            .all(|(left, right)| left.ty == right.ty && left.mode == right.mode)
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Binds classified contract members against a candidate index.
#[derive(Debug, Clone, Copy)]
pub struct BindingResolver<'a> {
    /// Candidate pool snapshot.
    index: &'a CandidateIndex,
    /// Zero-match policy.
    unmapped: UnmappedPolicy,
    /// Ambiguity severity policy.
    ambiguity: AmbiguityPolicy,
    /// Configured async generation.
    async_generation: AsyncGeneration,
    /// Whether sync and async shapes may be adapted.
    adapt_async: bool,
}

impl<'a> BindingResolver<'a> {
    /// Creates a resolver for the given options.
    #[must_use]
    pub fn new(index: &'a CandidateIndex, options: &SynthesisOptions) -> Self {
        Self {
            index,
            unmapped: options.unmapped_policy(),
            ambiguity: options.ambiguity,
            async_generation: options.async_generation,
            adapt_async: options.adapt_async,
        }
    }

    /// Returns every candidate matching a contract member, in declaration order.
    #[must_use]
    pub fn candidates_for(&self, member: &MemberDescriptor) -> Vec<Binding> {
        let mut matches: Vec<Binding> = Vec::new();
        if let Some(slots) = self.index.by_target.get(&member.name) {
            for &slot in slots {
                let candidate = &self.index.candidates[slot];
                let adaptation =
                    return_compatibility(&member.returns, &candidate.member.returns, self.adapt_async)
                        .unwrap_or(AsyncAdaptation::Direct);
                matches.push(Binding {
                    candidate: candidate.clone(),
                    adaptation,
                });
            }
        }
        let shape = (member.kind.key_tag(), parameter_shape_key(&member.parameters));
        if let Some(slots) = self.index.by_shape.get(&shape) {
            for &slot in slots {
                let candidate = &self.index.candidates[slot];
                if !parameters_match(member, &candidate.member) {
                    continue;
                }
                let Some(adaptation) =
                    return_compatibility(&member.returns, &candidate.member.returns, self.adapt_async)
                else {
                    continue;
                };
                matches.push(Binding {
                    candidate: candidate.clone(),
                    adaptation,
                });
            }
        }
        matches.sort_by_key(|binding| binding.candidate.order);
        matches
    }

    /// Resolves every member of a classified surface.
    ///
    /// The result keeps the surface order.
    #[must_use]
    pub fn resolve(
        &self,
        contract: &str,
        members: Vec<ClassifiedMember>,
        sink: &mut DiagnosticSink,
    ) -> Vec<ResolvedMember> {
        let mut resolved = Vec::with_capacity(members.len());
        for mut member in members {
            let anchor = SourceAnchor::on_member(
                contract,
                member.name(),
                member.descriptor.location.clone(),
            );
            member.bindings = self.candidates_for(&member.descriptor);
            let setter_anchor = anchor.clone();
            let resolution = match member.bindings.as_slice() {
                [] => self.resolve_unmapped(member.name(), anchor, sink),
                [single] => {
                    self.check_widening(&member, single, anchor, sink);
                    Resolution::Bound {
                        binding: single.clone(),
                    }
                }
                [first, ..] => {
                    let names = member
                        .bindings
                        .iter()
                        .map(|binding| format!("`{}`", binding.candidate.qualified_name()))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let severity = match self.ambiguity {
                        AmbiguityPolicy::Error => Severity::Error,
                        AmbiguityPolicy::Note => Severity::Info,
                    };
                    sink.report(
                        Diagnostic::new(
                            DiagnosticKind::AmbiguousBinding,
                            anchor.clone(),
                            vec![
                                member.name().to_string(),
                                member.bindings.len().to_string(),
                                names,
                                first.candidate.qualified_name(),
                            ],
                        )
                        .with_severity(severity),
                    );
                    self.check_widening(&member, first, anchor, sink);
                    Resolution::Bound {
                        binding: first.clone(),
                    }
                }
            };
            let setter = if member.descriptor.is_settable() {
                Some(self.resolve_setter(&member, &resolution, setter_anchor, sink))
            } else {
                None
            };
            resolved.push(ResolvedMember {
                member,
                resolution,
                setter,
            });
        }
        resolved
    }

    /// Applies the zero-match policy.
    fn resolve_unmapped(&self, label: &str, anchor: SourceAnchor, sink: &mut DiagnosticSink) -> Resolution {
        match self.unmapped {
            UnmappedPolicy::Error => {
                sink.emit(DiagnosticKind::UnmappedMember, anchor, vec![label.to_string()]);
                Resolution::Unmapped
            }
            UnmappedPolicy::Stub => {
                sink.emit(DiagnosticKind::StubbedMember, anchor, vec![label.to_string()]);
                Resolution::Stub
            }
            UnmappedPolicy::Ignore => Resolution::Default,
        }
    }

    /// Resolves a settable property's setter from the getter's resolution.
    ///
    /// A bound candidate must declare a setter of its own; otherwise the
    /// setter alone goes through the zero-match policy.
    fn resolve_setter(
        &self,
        member: &ClassifiedMember,
        getter: &Resolution,
        anchor: SourceAnchor,
        sink: &mut DiagnosticSink,
    ) -> Resolution {
        match getter {
            Resolution::Bound {
                binding,
            } if binding.candidate.member.is_settable() => Resolution::Bound {
                binding: binding.clone(),
            },
            Resolution::Bound {
                ..
            } => self.resolve_unmapped(&format!("{} (setter)", member.name()), anchor, sink),
            unbound => unbound.clone(),
        }
    }

    /// Warns when an async binding widens a surface configured as synchronous.
    fn check_widening(
        &self,
        member: &ClassifiedMember,
        binding: &Binding,
        anchor: SourceAnchor,
        sink: &mut DiagnosticSink,
    ) {
        let candidate_async = binding.candidate.member.async_shape().is_async();
        if candidate_async
            && self.async_generation == AsyncGeneration::ForceOff
            && binding.adaptation != AsyncAdaptation::BlockOn
        {
            sink.emit(
                DiagnosticKind::AsyncWidening,
                anchor,
                vec![member.name().to_string(), binding.candidate.qualified_name()],
            );
        }
    }
}
