// crates/patternsmith-core/src/analysis/classifier.rs
// ============================================================================
// Module: Member Classifier
// Description: Eligibility filtering and tagging of raw contract members.
// Purpose: Produce the ordered, all-or-nothing forwardable surface.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! Each raw member passes through a fixed sequence of filters. Static members,
//! special members, and fields are skipped silently; generic methods, indexers,
//! nested types, and events are Errors; inaccessible members and accessors are
//! Warnings that drop only the offending member.
//!
//! If any Error is raised the classifier returns an empty surface so that no
//! caller can emit a partially-conformant artifact. Survivors are sorted by
//! [`SignatureKey`] under ordinal comparison, which makes the output
//! independent of declaration and traversal order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use tracing::debug;

use crate::analysis::binding::Binding;
use crate::analysis::walker::RawMember;
use crate::core::contract::ContractSurface;
use crate::core::contract::ContractVariant;
use crate::core::diagnostics::DiagnosticKind;
use crate::core::diagnostics::DiagnosticSink;
use crate::core::diagnostics::SourceAnchor;
use crate::core::model::AsyncShape;
use crate::core::model::MemberDescriptor;
use crate::core::model::MemberKind;
use crate::core::model::SpecialKind;
use crate::core::signature::SignatureKey;

// ============================================================================
// SECTION: Classified Member
// ============================================================================

/// A raw member plus derived eligibility flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedMember {
    /// Underlying descriptor.
    pub descriptor: MemberDescriptor,
    /// Deduplication and ordering key.
    pub key: SignatureKey,
    /// Type that declared the member.
    pub declared_in: String,
    /// Async classification of the return shape.
    pub async_shape: AsyncShape,
    /// True when the generated artifact must emit the member.
    pub forwardable: bool,
    /// True when subtypes may override the member.
    pub overridable: bool,
    /// True when no inherited implementation exists.
    pub requires_implementation: bool,
    /// True when the member opted out of decoration hooks.
    pub ignored: bool,
    /// Candidate bindings (matching-style patterns only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
}

impl ClassifiedMember {
    /// Returns the member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

// ============================================================================
// SECTION: Classifier
// ============================================================================

/// Applies the eligibility rules to a walked surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberClassifier;

impl MemberClassifier {
    /// Classifies raw members, returning an empty surface on any Error.
    #[must_use]
    pub fn classify(
        self,
        contract: &ContractSurface,
        raw_members: Vec<RawMember>,
        sink: &mut DiagnosticSink,
    ) -> Vec<ClassifiedMember> {
        let checkpoint = sink.checkpoint();
        let partial_base = contract.variant == ContractVariant::PartialBase;
        let mut classified = Vec::with_capacity(raw_members.len());

        for raw in raw_members {
            let member = &raw.descriptor;
            if member.is_static || member.special != SpecialKind::Ordinary {
                continue;
            }
            if member.kind == MemberKind::Field {
                continue;
            }
            if partial_base && !member.is_overridable() {
                continue;
            }
            let anchor =
                SourceAnchor::on_member(&raw.declared_in, &member.name, member.location.clone());
            if !admissible_kind(member, &anchor, sink) {
                continue;
            }
            if !reachable(member, contract.name(), &anchor, sink) {
                continue;
            }
            let async_shape = member.async_shape();
            let requires_implementation = !partial_base || member.is_abstract;
            let overridable = !partial_base || member.is_overridable();
            let ignored = member.markers.ignore;
            classified.push(ClassifiedMember {
                async_shape,
                forwardable: !ignored || requires_implementation,
                overridable,
                requires_implementation,
                ignored,
                bindings: Vec::new(),
                declared_in: raw.declared_in,
                key: raw.key,
                descriptor: raw.descriptor,
            });
        }

        if sink.errors_since(checkpoint) {
            debug!(contract = %contract.name(), "classification raised errors; surface discarded");
            return Vec::new();
        }
        classified.sort_by(|left, right| left.key.cmp(&right.key));
        if classified.is_empty() {
            sink.emit(
                DiagnosticKind::EmptySurface,
                contract.declaration.anchor(),
                vec![contract.name().to_string()],
            );
        }
        debug!(contract = %contract.name(), members = classified.len(), "surface classified");
        classified
    }
}

/// Rejects member kinds that cannot be part of a forwarded surface.
fn admissible_kind(member: &MemberDescriptor, anchor: &SourceAnchor, sink: &mut DiagnosticSink) -> bool {
    let kind = if member.is_generic() {
        DiagnosticKind::GenericMember
    } else if member.is_indexer() {
        DiagnosticKind::IndexerMember
    } else if member.kind == MemberKind::NestedType {
        DiagnosticKind::NestedTypeMember
    } else if member.kind == MemberKind::Event {
        DiagnosticKind::EventMember
    } else {
        return true;
    };
    sink.emit(kind, anchor.clone(), vec![member.name.clone()]);
    false
}

/// Applies the member- and accessor-level accessibility filters.
fn reachable(
    member: &MemberDescriptor,
    contract: &str,
    anchor: &SourceAnchor,
    sink: &mut DiagnosticSink,
) -> bool {
    if !member.accessibility.is_forwardable() {
        sink.emit(
            DiagnosticKind::InaccessibleMember,
            anchor.clone(),
            vec![
                member.name.clone(),
                member.accessibility.as_str().to_string(),
                contract.to_string(),
            ],
        );
        return false;
    }
    let Some(accessors) = member.accessors.filter(|_| member.kind == MemberKind::Property) else {
        return true;
    };
    let mut reachable = true;
    for (label, accessibility) in [("get", accessors.get), ("set", accessors.set)] {
        if let Some(accessibility) = accessibility.filter(|level| !level.is_forwardable()) {
            sink.emit(
                DiagnosticKind::InaccessibleAccessor,
                anchor.clone(),
                vec![member.name.clone(), label.to_string(), accessibility.as_str().to_string()],
            );
            reachable = false;
        }
    }
    reachable
}
