// crates/patternsmith-core/src/analysis/walker.rs
// ============================================================================
// Module: Surface Walker
// Description: Traversal of a contract's declared and inherited members.
// Purpose: Yield a signature-deduplicated raw member stream.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! Capability sets are walked over their flattened interface closure:
//! the contract's own members first, then every transitively implemented
//! capability set in depth-first order, visiting supertypes by ordinal name.
//! Diamonds reintroduce the same logical member through several paths; each
//! [`SignatureKey`] contributes one member, taken from the contract itself
//! when it redeclares the member and otherwise from the ordinally smallest
//! declaring type.
//!
//! Partially-implemented bases are walked up the base chain until the implicit
//! root type. Overridability is not filtered here; the classifier needs the
//! full stream to judge kind and accessibility first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use tracing::debug;

use crate::core::contract::ContractSurface;
use crate::core::contract::ContractVariant;
use crate::core::contract::TypeCatalog;
use crate::core::contract::TypeDecl;
use crate::core::diagnostics::DiagnosticKind;
use crate::core::diagnostics::DiagnosticSink;
use crate::core::diagnostics::SourceAnchor;
use crate::core::model::MemberDescriptor;
use crate::core::signature::SignatureKey;

// ============================================================================
// SECTION: Raw Members
// ============================================================================

/// Pre-classification member yielded by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMember {
    /// Declared member.
    pub descriptor: MemberDescriptor,
    /// Name of the type that declared the member.
    pub declared_in: String,
    /// Deduplication key.
    pub key: SignatureKey,
}

/// Accumulates members while deduplicating by signature key.
///
/// Capability sets pick one copy per key by a fixed rule (the contract's own
/// declaration, else the ordinally smallest declaring type), so the surface
/// does not depend on the order supertypes are listed in. Base chains keep
/// the most-derived copy.
struct SurfaceCollector<'a> {
    /// Contract whose surface is being collected (diagnostic anchor).
    contract: &'a TypeDecl,
    /// True for capability sets: pick copies by rule and report conflicts.
    capability_set: bool,
    /// Index into `members` per key.
    seen: BTreeMap<SignatureKey, usize>,
    /// Distinct rendered return types seen per key.
    returns: BTreeMap<SignatureKey, BTreeSet<String>>,
    /// Members in discovery order.
    members: Vec<RawMember>,
}

impl SurfaceCollector<'_> {
    /// Adds every member of a declaration.
    fn collect(&mut self, decl: &TypeDecl) {
        for member in &decl.members {
            let key = SignatureKey::of(member);
            if self.capability_set {
                self.returns.entry(key.clone()).or_default().insert(member.returns.to_string());
            }
            let Some(&index) = self.seen.get(&key) else {
                self.seen.insert(key.clone(), self.members.len());
                self.members.push(RawMember {
                    descriptor: member.clone(),
                    declared_in: decl.name.clone(),
                    key,
                });
                continue;
            };
            if !self.capability_set {
                continue;
            }
            let Some(current) = self.members.get_mut(index) else {
                continue;
            };
            if current.declared_in != self.contract.name && decl.name < current.declared_in {
                current.descriptor = member.clone();
                current.declared_in.clone_from(&decl.name);
            }
        }
    }

    /// Reports keys inherited with differing return types and returns the members.
    fn finish(self, sink: &mut DiagnosticSink) -> Vec<RawMember> {
        for member in &self.members {
            let Some(returns) = self.returns.get(&member.key) else {
                continue;
            };
            let mut returns = returns.iter();
            let Some(first) = returns.next() else {
                continue;
            };
            for other in returns {
                sink.emit(
                    DiagnosticKind::ConflictingMember,
                    self.contract.member_anchor(&member.descriptor),
                    vec![member.key.to_string(), first.clone(), other.clone()],
                );
            }
        }
        self.members
    }
}

// ============================================================================
// SECTION: Walker
// ============================================================================

/// Traverses contract surfaces against a catalog snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceWalker<'a> {
    /// Declarations visible to the invocation.
    catalog: &'a TypeCatalog,
}

impl<'a> SurfaceWalker<'a> {
    /// Creates a walker over a catalog.
    #[must_use]
    pub const fn new(catalog: &'a TypeCatalog) -> Self {
        Self {
            catalog,
        }
    }

    /// Walks a captured contract and returns its deduplicated raw members.
    ///
    /// Unresolved supertypes and inheritance cycles are reported; members
    /// discovered before the failure are still returned so the classifier
    /// can report everything it finds.
    #[must_use]
    pub fn walk(&self, contract: &ContractSurface, sink: &mut DiagnosticSink) -> Vec<RawMember> {
        let mut collector = SurfaceCollector {
            contract: &contract.declaration,
            capability_set: contract.variant == ContractVariant::CapabilitySet,
            seen: BTreeMap::new(),
            returns: BTreeMap::new(),
            members: Vec::new(),
        };
        match contract.variant {
            ContractVariant::CapabilitySet => {
                let mut visited = BTreeSet::new();
                let mut path = vec![contract.name().to_string()];
                visited.insert(contract.name().to_string());
                collector.collect(&contract.declaration);
                self.walk_interfaces(&contract.declaration, &mut path, &mut visited, &mut collector, sink);
            }
            ContractVariant::PartialBase => self.walk_base_chain(contract, &mut collector, sink),
        }
        let members = collector.finish(sink);
        debug!(
            contract = %contract.name(),
            variant = ?contract.variant,
            members = members.len(),
            "surface walked"
        );
        members
    }

    /// Depth-first traversal of the implemented-interface closure.
    fn walk_interfaces(
        &self,
        decl: &TypeDecl,
        path: &mut Vec<String>,
        visited: &mut BTreeSet<String>,
        collector: &mut SurfaceCollector<'_>,
        sink: &mut DiagnosticSink,
    ) {
        let mut interfaces: Vec<&String> = decl.interfaces.iter().collect();
        interfaces.sort();
        for name in interfaces {
            if path.iter().any(|entry| entry == name) {
                sink.emit(DiagnosticKind::InheritanceCycle, decl.anchor(), vec![name.clone()]);
                continue;
            }
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(parent) = self.catalog.get(name) else {
                sink.emit(
                    DiagnosticKind::UnresolvedType,
                    SourceAnchor::on_type(&decl.name, decl.location.clone()),
                    vec![name.clone()],
                );
                continue;
            };
            collector.collect(parent);
            path.push(name.clone());
            self.walk_interfaces(parent, path, visited, collector, sink);
            path.pop();
        }
    }

    /// Upward traversal of the base chain until the implicit root type.
    fn walk_base_chain(
        &self,
        contract: &ContractSurface,
        collector: &mut SurfaceCollector<'_>,
        sink: &mut DiagnosticSink,
    ) {
        let mut visited = BTreeSet::new();
        let mut current = &contract.declaration;
        loop {
            visited.insert(current.name.clone());
            collector.collect(current);
            let Some(base_name) = &current.base else {
                return;
            };
            if visited.contains(base_name) {
                sink.emit(
                    DiagnosticKind::InheritanceCycle,
                    current.anchor(),
                    vec![base_name.clone()],
                );
                return;
            }
            let Some(base) = self.catalog.get(base_name) else {
                sink.emit(DiagnosticKind::UnresolvedType, current.anchor(), vec![base_name.clone()]);
                return;
            };
            if base.root {
                return;
            }
            current = base;
        }
    }
}
