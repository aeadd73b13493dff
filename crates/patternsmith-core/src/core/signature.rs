// crates/patternsmith-core/src/core/signature.rs
// ============================================================================
// Module: Signature Keying
// Description: Stable textual keys derived from member descriptors.
// Purpose: Deduplicate members and define the total emission order.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`SignatureKey`] encodes a member's kind, name, and ordered parameter
//! shape (`mode type` tuples). Two descriptors are equivalent iff their keys
//! are equal. Keys compare ordinally (byte-wise), which gives the emission
//! order used by every generator.
//!
//! Format: `{tag}:{name}` for properties, events, fields, and nested types;
//! `{tag}:{name}({mode type}, ...)` for methods and indexers, e.g.
//! `M:Read(ref Buffer, int)` or `M:Flush()`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;

use crate::core::model::MemberDescriptor;
use crate::core::model::MemberKind;
use crate::core::model::Parameter;

// ============================================================================
// SECTION: Signature Key
// ============================================================================

/// Deterministic member key used for deduplication and ordinal ordering.
///
/// # Invariants
/// - Derived only through [`SignatureKey::of`]; never stored independently of
///   the descriptor it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureKey(String);

impl SignatureKey {
    /// Computes the key for a member descriptor.
    #[must_use]
    pub fn of(member: &MemberDescriptor) -> Self {
        let mut key = String::with_capacity(member.name.len() + 8);
        key.push_str(member.kind.key_tag());
        key.push(':');
        key.push_str(&member.name);
        if member.kind == MemberKind::Method || member.is_indexer() {
            key.push('(');
            key.push_str(&parameter_shape_key(&member.parameters));
            key.push(')');
        }
        Self(key)
    }

    /// Returns the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encodes an ordered parameter list as `mode type` tuples joined by `, `.
///
/// Parameter names and default values do not participate.
#[must_use]
pub fn parameter_shape_key(parameters: &[Parameter]) -> String {
    let mut out = String::new();
    for (index, parameter) in parameters.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        let keyword = parameter.mode.keyword();
        if !keyword.is_empty() {
            out.push_str(keyword);
            out.push(' ');
        }
        let _ = write!(out, "{}", parameter.ty);
    }
    out
}
