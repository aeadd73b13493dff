// crates/patternsmith-core/src/core/contract.rs
// ============================================================================
// Module: Contracts and Type Catalog
// Description: Program declaration snapshot and captured synthesis targets.
// Purpose: Capture contracts and composition hosts with structural validation.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`TypeCatalog`] is the read-only snapshot of every declaration visible to
//! one synthesis invocation. Targets are *captured* from it: capture performs
//! the structural checks (unresolved, wrong variant, generic, nested) and
//! reports every failure before returning, so a single run surfaces all
//! structural problems at once.
//!
//! Catalog input is untrusted and size-limited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::diagnostics::DiagnosticKind;
use crate::core::diagnostics::DiagnosticSink;
use crate::core::diagnostics::SourceAnchor;
use crate::core::diagnostics::SourceLocation;
use crate::core::model::MemberDescriptor;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum catalog file size in bytes.
pub const MAX_CATALOG_BYTES: u64 = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Type Declarations
// ============================================================================

/// Nominal kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Capability set with no executable members of its own.
    Interface,
    /// Reference type that may carry implemented members.
    Class,
    /// Value type.
    Struct,
    /// Enumeration.
    Enum,
}

impl TypeKind {
    /// Returns a stable label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interface => "interface",
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Enum => "enum",
        }
    }
}

/// Ownership tag deciding how generated continuations capture the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostSemantics {
    /// Copied on assignment; continuations close over a snapshot.
    Value,
    /// Shared by reference; continuations close over the host directly.
    #[default]
    Reference,
}

/// One declaration in the program catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Fully-qualified type name (catalog key).
    pub name: String,
    /// Declaring namespace.
    #[serde(default)]
    pub namespace: String,
    /// Nominal kind.
    pub kind: TypeKind,
    /// True when the type cannot be derived from.
    #[serde(default)]
    pub sealed: bool,
    /// True for abstract classes.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Marks the implicit root type where base-chain walks stop.
    #[serde(default)]
    pub root: bool,
    /// Number of declared type parameters.
    #[serde(default)]
    pub generic_arity: u32,
    /// Enclosing type, when nested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type: Option<String>,
    /// Base class, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Directly implemented capability sets, in declaration order.
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Declared members, in declaration order.
    #[serde(default)]
    pub members: Vec<MemberDescriptor>,
    /// Extension-point capability: the build may merge a generated fragment in.
    #[serde(default)]
    pub extensible: bool,
    /// Ownership tag.
    #[serde(default)]
    pub semantics: HostSemantics,
    /// Declaration position, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl TypeDecl {
    /// Creates an empty declaration of the given kind.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            kind,
            sealed: false,
            is_abstract: false,
            root: false,
            generic_arity: 0,
            containing_type: None,
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            extensible: false,
            semantics: if kind == TypeKind::Struct {
                HostSemantics::Value
            } else {
                HostSemantics::Reference
            },
            location: None,
        }
    }

    /// Appends a member.
    #[must_use]
    pub fn with_member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    /// Appends an implemented capability set.
    #[must_use]
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Sets the base class.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Marks the type as an extension point.
    #[must_use]
    pub const fn extensible(mut self) -> Self {
        self.extensible = true;
        self
    }

    /// Returns the diagnostic anchor for the declaration.
    #[must_use]
    pub fn anchor(&self) -> SourceAnchor {
        SourceAnchor::on_type(&self.name, self.location.clone())
    }

    /// Returns the diagnostic anchor for one of the declaration's members.
    #[must_use]
    pub fn member_anchor(&self, member: &MemberDescriptor) -> SourceAnchor {
        SourceAnchor::on_member(
            &self.name,
            &member.name,
            member.location.clone().or_else(|| self.location.clone()),
        )
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Errors raised while loading a type catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog I/O failed.
    #[error("catalog io error: {0}")]
    Io(String),
    /// Catalog JSON was malformed.
    #[error("catalog parse error: {0}")]
    Json(String),
    /// Catalog exceeded the size limit.
    #[error("catalog exceeds {MAX_CATALOG_BYTES} bytes")]
    TooLarge,
    /// Two declarations share a name.
    #[error("duplicate type declaration: {0}")]
    DuplicateType(String),
}

/// On-disk catalog shape.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    /// Declarations in file order.
    types: Vec<TypeDecl>,
}

/// Read-only snapshot of the program's declarations.
///
/// # Invariants
/// - Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCatalog {
    /// Declarations keyed by fully-qualified name.
    types: BTreeMap<String, TypeDecl>,
}

impl TypeCatalog {
    /// Builds a catalog from declarations.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateType`] when two declarations share a name.
    pub fn from_types(types: impl IntoIterator<Item = TypeDecl>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for decl in types {
            if map.contains_key(&decl.name) {
                return Err(CatalogError::DuplicateType(decl.name));
            }
            map.insert(decl.name.clone(), decl);
        }
        Ok(Self {
            types: map,
        })
    }

    /// Parses a catalog from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the JSON is malformed or names repeat.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_slice(bytes).map_err(|err| CatalogError::Json(err.to_string()))?;
        Self::from_types(file.types)
    }

    /// Loads a catalog from disk with a hard size limit.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on I/O failure, oversize input, or bad JSON.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file = fs::File::open(path).map_err(|err| CatalogError::Io(err.to_string()))?;
        let metadata = file.metadata().map_err(|err| CatalogError::Io(err.to_string()))?;
        if metadata.len() > MAX_CATALOG_BYTES {
            return Err(CatalogError::TooLarge);
        }
        let mut bytes = Vec::new();
        let mut limited = file.take(MAX_CATALOG_BYTES + 1);
        limited.read_to_end(&mut bytes).map_err(|err| CatalogError::Io(err.to_string()))?;
        if !u64::try_from(bytes.len()).is_ok_and(|size| size <= MAX_CATALOG_BYTES) {
            return Err(CatalogError::TooLarge);
        }
        Self::from_json(&bytes)
    }

    /// Returns a declaration by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDecl> {
        self.types.get(name)
    }

    /// Returns true when a declaration exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns the number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true when the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// ============================================================================
// SECTION: Captured Targets
// ============================================================================

/// Variant of a captured contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractVariant {
    /// Pure capability set; the walker follows the interface closure.
    CapabilitySet,
    /// Partially-implemented base; the walker follows the base chain.
    PartialBase,
}

/// Nominal contract under synthesis.
///
/// # Invariants
/// - Generic arity and nesting depth are zero.
/// - Immutable once captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSurface {
    /// Contract variant.
    pub variant: ContractVariant,
    /// Captured declaration.
    pub declaration: TypeDecl,
}

impl ContractSurface {
    /// Captures a contract, reporting every structural violation.
    ///
    /// Returns `None` when any structural Error was reported.
    #[must_use]
    pub fn capture(catalog: &TypeCatalog, name: &str, sink: &mut DiagnosticSink) -> Option<Self> {
        let checkpoint = sink.checkpoint();
        let Some(decl) = catalog.get(name) else {
            sink.emit(
                DiagnosticKind::UnresolvedType,
                SourceAnchor::on_type(name, None),
                vec![name.to_string()],
            );
            return None;
        };
        let variant = match decl.kind {
            TypeKind::Interface => Some(ContractVariant::CapabilitySet),
            TypeKind::Class if !decl.sealed => Some(ContractVariant::PartialBase),
            TypeKind::Class => {
                sink.emit(
                    DiagnosticKind::WrongContractVariant,
                    decl.anchor(),
                    vec![decl.name.clone(), "sealed class".to_string()],
                );
                None
            }
            kind => {
                sink.emit(
                    DiagnosticKind::WrongContractVariant,
                    decl.anchor(),
                    vec![decl.name.clone(), kind.as_str().to_string()],
                );
                None
            }
        };
        check_shape(decl, sink);
        match variant {
            Some(variant) if !sink.errors_since(checkpoint) => Some(Self {
                variant,
                declaration: decl.clone(),
            }),
            _ => None,
        }
    }

    /// Returns the contract name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    /// Returns the contract namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.declaration.namespace
    }
}

/// Extensible type that declares composition steps.
///
/// # Invariants
/// - Always a non-generic, non-nested, extensible class or struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionHost {
    /// Captured declaration.
    pub declaration: TypeDecl,
}

impl CompositionHost {
    /// Captures a composition host, reporting every structural violation.
    #[must_use]
    pub fn capture(catalog: &TypeCatalog, name: &str, sink: &mut DiagnosticSink) -> Option<Self> {
        let checkpoint = sink.checkpoint();
        let Some(decl) = catalog.get(name) else {
            sink.emit(
                DiagnosticKind::UnresolvedType,
                SourceAnchor::on_type(name, None),
                vec![name.to_string()],
            );
            return None;
        };
        if !matches!(decl.kind, TypeKind::Class | TypeKind::Struct) {
            sink.emit(
                DiagnosticKind::WrongHostVariant,
                decl.anchor(),
                vec![decl.name.clone(), decl.kind.as_str().to_string()],
            );
        }
        if !decl.extensible {
            sink.emit(DiagnosticKind::HostNotExtensible, decl.anchor(), vec![decl.name.clone()]);
        }
        check_shape(decl, sink);
        if sink.errors_since(checkpoint) {
            return None;
        }
        Some(Self {
            declaration: decl.clone(),
        })
    }

    /// Returns the host name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    /// Returns the host ownership tag.
    #[must_use]
    pub const fn semantics(&self) -> HostSemantics {
        self.declaration.semantics
    }
}

/// Reports generic and nested declarations.
fn check_shape(decl: &TypeDecl, sink: &mut DiagnosticSink) {
    if decl.generic_arity > 0 {
        sink.emit(
            DiagnosticKind::GenericContract,
            decl.anchor(),
            vec![decl.name.clone(), decl.generic_arity.to_string()],
        );
    }
    if let Some(container) = &decl.containing_type {
        sink.emit(
            DiagnosticKind::NestedContract,
            decl.anchor(),
            vec![decl.name.clone(), container.clone()],
        );
    }
}
