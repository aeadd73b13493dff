// crates/patternsmith-core/src/core/model.rs
// ============================================================================
// Module: Member Descriptor Model
// Description: Language-neutral representation of discoverable contract members.
// Purpose: Describe member kind, parameters, return shape, and accessibility.
// Dependencies: serde, smallvec, thiserror
// ============================================================================

//! ## Overview
//! Every declaration the engine reasons about is lowered into a
//! [`MemberDescriptor`]. Descriptors are produced once per invocation by the
//! surface walker and are read-only for every later phase.
//!
//! Type references are written in a compact textual form (`Name<Arg, Arg>`,
//! `()` for unit) so catalogs stay readable; [`TypeRef`] parses and renders
//! that form losslessly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::core::diagnostics::SourceLocation;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Well-known completion-handle type names (matched on the last path segment).
pub const COMPLETION_HANDLE_NAMES: &[&str] =
    &["Future", "BoxFuture", "LocalBoxFuture", "JoinHandle", "Deferred"];

/// Well-known cancellation-signal type names (matched on the last path segment).
pub const CANCELLATION_TOKEN_NAMES: &[&str] = &["CancellationToken", "CancelToken"];

/// Textual name of the unit type.
pub const UNIT_TYPE_NAME: &str = "()";

/// Maximum nesting depth accepted when parsing a type reference.
const MAX_TYPE_DEPTH: usize = 32;

// ============================================================================
// SECTION: Type References
// ============================================================================

/// Reference to a (possibly generic) type by name.
///
/// # Invariants
/// - `name` is non-empty.
/// - The unit type is represented by [`UNIT_TYPE_NAME`] with no arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    /// Type name, optionally path-qualified (`a::b::Name`).
    pub name: String,
    /// Generic arguments in declaration order.
    pub args: Vec<Self>,
}

impl TypeRef {
    /// Creates a non-generic type reference.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Creates a generic type reference.
    #[must_use]
    pub fn generic(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Returns the unit type.
    #[must_use]
    pub fn unit() -> Self {
        Self::named(UNIT_TYPE_NAME)
    }

    /// Returns true for the unit type.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.name == UNIT_TYPE_NAME && self.args.is_empty()
    }

    /// Returns the last path segment of the type name.
    #[must_use]
    pub fn base_name(&self) -> &str {
        let name = self.name.as_str();
        let after_colons = name.rsplit("::").next().unwrap_or(name);
        after_colons.rsplit('.').next().unwrap_or(after_colons)
    }

    /// Returns true when the type is a recognised completion handle.
    #[must_use]
    pub fn is_completion_handle(&self) -> bool {
        COMPLETION_HANDLE_NAMES.contains(&self.base_name()) && self.args.len() <= 1
    }

    /// Returns true when the type is a recognised cancellation signal.
    #[must_use]
    pub fn is_cancellation_token(&self) -> bool {
        CANCELLATION_TOKEN_NAMES.contains(&self.base_name())
    }

    /// Classifies this type when used as a return shape.
    #[must_use]
    pub fn async_shape(&self) -> AsyncShape {
        if !self.is_completion_handle() {
            return AsyncShape::Sync;
        }
        match self.args.first() {
            Some(result) if !result.is_unit() => AsyncShape::AsyncWithResult,
            _ => AsyncShape::AsyncNoResult,
        }
    }

    /// Returns the carried result type, unwrapping a completion handle.
    ///
    /// Non-handle types are returned unchanged; a handle without a carried
    /// result unwraps to unit.
    #[must_use]
    pub fn unwrap_completion(&self) -> Self {
        if !self.is_completion_handle() {
            return self.clone();
        }
        self.args.first().cloned().unwrap_or_else(Self::unit)
    }

    /// Parses the compact textual form.
    ///
    /// # Errors
    ///
    /// Returns [`TypeRefError`] when the text is not a well-formed type reference.
    pub fn parse(text: &str) -> Result<Self, TypeRefError> {
        let mut parser = TypeRefParser {
            input: text.as_bytes(),
            text,
            position: 0,
        };
        let parsed = parser.parse_type(0)?;
        parser.skip_whitespace();
        if parser.position != parser.input.len() {
            return Err(TypeRefError::Trailing(text.to_string()));
        }
        Ok(parsed)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (index, arg) in self.args.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            arg.fmt(f)?;
        }
        f.write_str(">")
    }
}

impl FromStr for TypeRef {
    type Err = TypeRefError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeRefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

/// Errors raised while parsing a textual type reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeRefError {
    /// The input was empty or a name was missing.
    #[error("expected a type name in `{0}`")]
    MissingName(String),
    /// A generic argument list was not closed.
    #[error("unterminated generic argument list in `{0}`")]
    Unterminated(String),
    /// Unexpected characters followed a complete type.
    #[error("unexpected trailing input in `{0}`")]
    Trailing(String),
    /// Generic arguments nested too deeply.
    #[error("type reference nests deeper than {MAX_TYPE_DEPTH} levels: `{0}`")]
    TooDeep(String),
}

/// Recursive-descent parser for [`TypeRef`] text.
struct TypeRefParser<'a> {
    /// Raw input bytes.
    input: &'a [u8],
    /// Original text for error messages.
    text: &'a str,
    /// Current byte offset.
    position: usize,
}

impl TypeRefParser<'_> {
    /// Parses a single type at the current position.
    fn parse_type(&mut self, depth: usize) -> Result<TypeRef, TypeRefError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(TypeRefError::TooDeep(self.text.to_string()));
        }
        self.skip_whitespace();
        if self.eat(b'(') {
            self.skip_whitespace();
            if !self.eat(b')') {
                return Err(TypeRefError::Unterminated(self.text.to_string()));
            }
            return Ok(TypeRef::unit());
        }
        let start = self.position;
        while let Some(&byte) = self.input.get(self.position) {
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.' || byte == b':' {
                self.position += 1;
            } else {
                break;
            }
        }
        let name = self.text[start .. self.position].trim_end_matches(':');
        if name.is_empty() {
            return Err(TypeRefError::MissingName(self.text.to_string()));
        }
        let name = name.to_string();
        self.skip_whitespace();
        if !self.eat(b'<') {
            return Ok(TypeRef::named(name));
        }
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type(depth + 1)?);
            self.skip_whitespace();
            if self.eat(b',') {
                continue;
            }
            if self.eat(b'>') {
                break;
            }
            return Err(TypeRefError::Unterminated(self.text.to_string()));
        }
        Ok(TypeRef::generic(name, args))
    }

    /// Consumes `byte` if it is next in the input.
    fn eat(&mut self, byte: u8) -> bool {
        if self.input.get(self.position) == Some(&byte) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Advances past ASCII whitespace.
    fn skip_whitespace(&mut self) {
        while self.input.get(self.position).is_some_and(u8::is_ascii_whitespace) {
            self.position += 1;
        }
    }
}

// ============================================================================
// SECTION: Member Attributes
// ============================================================================

/// By-reference passing mode for a parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefMode {
    /// Passed by value.
    #[default]
    Value,
    /// Passed by mutable reference.
    Ref,
    /// Passed by read-only reference.
    In,
    /// Output parameter written by the callee.
    Out,
}

impl RefMode {
    /// Returns the stable keyword used in signature keys (empty for by-value).
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Value => "",
            Self::Ref => "ref",
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

/// Declared accessibility of a member or accessor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// Visible everywhere.
    #[default]
    Public,
    /// Visible within the declaring assembly or crate.
    Internal,
    /// Visible to subtypes or within the declaring assembly.
    ProtectedInternal,
    /// Visible to subtypes only.
    Protected,
    /// Visible to subtypes within the declaring assembly only.
    PrivateProtected,
    /// Visible to the declaring type only.
    Private,
}

impl Accessibility {
    /// Returns true when a reference typed as the contract can reach the member.
    #[must_use]
    pub const fn is_forwardable(self) -> bool {
        matches!(self, Self::Public | Self::Internal | Self::ProtectedInternal)
    }

    /// Returns a stable label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::ProtectedInternal => "protected internal",
            Self::Protected => "protected",
            Self::PrivateProtected => "private protected",
            Self::Private => "private",
        }
    }
}

/// Kind of a discoverable member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// Callable method.
    Method,
    /// Property (an indexer when it declares parameters).
    Property,
    /// Multicast event.
    Event,
    /// Data field.
    Field,
    /// Nested type declaration.
    NestedType,
}

impl MemberKind {
    /// Returns the single-letter tag used in signature keys.
    #[must_use]
    pub const fn key_tag(self) -> &'static str {
        match self {
            Self::Method => "M",
            Self::Property => "P",
            Self::Event => "E",
            Self::Field => "F",
            Self::NestedType => "T",
        }
    }
}

/// Special-member classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    /// Regular member.
    #[default]
    Ordinary,
    /// Constructor.
    Constructor,
    /// Operator overload.
    Operator,
    /// Property or event accessor viewed standalone.
    Accessor,
}

/// Asynchronous classification of a return shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsyncShape {
    /// Plain synchronous value.
    Sync,
    /// Completion handle without a carried result.
    AsyncNoResult,
    /// Completion handle carrying a result.
    AsyncWithResult,
}

impl AsyncShape {
    /// Returns true for either asynchronous classification.
    #[must_use]
    pub const fn is_async(self) -> bool {
        !matches!(self, Self::Sync)
    }
}

/// Accessor accessibility for a property; `None` means the accessor is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAccessors {
    /// Getter accessibility.
    #[serde(default)]
    pub get: Option<Accessibility>,
    /// Setter accessibility.
    #[serde(default)]
    pub set: Option<Accessibility>,
}

/// Composition step marker attached to a host method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMarker {
    /// Explicit ordering rank.
    pub rank: i32,
    /// Optional display name (defaults to the method name).
    #[serde(default)]
    pub name: Option<String>,
}

/// Declarative markers attached to a member by the marker-parsing collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberMarkers {
    /// Opt-out from decoration hooks.
    #[serde(default)]
    pub ignore: bool,
    /// Explicit contract member name this implementation maps to.
    #[serde(default)]
    pub target: Option<String>,
    /// Composition step marker.
    #[serde(default)]
    pub step: Option<StepMarker>,
    /// Composition terminal marker.
    #[serde(default)]
    pub terminal: bool,
}

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Formal parameter of a method or indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// By-reference passing mode.
    #[serde(default)]
    pub mode: RefMode,
    /// Default-value literal, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl Parameter {
    /// Creates a by-value parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            mode: RefMode::Value,
            default_value: None,
        }
    }

    /// Returns this parameter with the given passing mode.
    #[must_use]
    pub fn with_mode(mut self, mode: RefMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Parameter list; most members declare only a handful of parameters.
pub type ParameterList = SmallVec<[Parameter; 4]>;

// ============================================================================
// SECTION: Member Descriptor
// ============================================================================

/// Canonical description of a discoverable member.
///
/// # Invariants
/// - For properties, `returns` is the property type.
/// - For methods without a result, `returns` is unit.
/// - Equivalence is defined by [`crate::SignatureKey`], not by structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    /// Member kind.
    pub kind: MemberKind,
    /// Member name.
    pub name: String,
    /// Special-member classification.
    #[serde(default)]
    pub special: SpecialKind,
    /// Declared accessibility.
    #[serde(default)]
    pub accessibility: Accessibility,
    /// True for static members.
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// True for virtual (overridable) members.
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    /// True for abstract members.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Generic type parameter names declared by the member itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    /// Formal parameters.
    #[serde(default)]
    pub parameters: ParameterList,
    /// Return shape (property type for properties).
    #[serde(default = "TypeRef::unit")]
    pub returns: TypeRef,
    /// Accessor accessibility for properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessors: Option<PropertyAccessors>,
    /// Declarative markers.
    #[serde(default)]
    pub markers: MemberMarkers,
    /// Source location, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl MemberDescriptor {
    /// Creates a public instance method.
    #[must_use]
    pub fn method(name: impl Into<String>, parameters: Vec<Parameter>, returns: TypeRef) -> Self {
        Self {
            kind: MemberKind::Method,
            name: name.into(),
            special: SpecialKind::Ordinary,
            accessibility: Accessibility::Public,
            is_static: false,
            is_virtual: false,
            is_abstract: false,
            type_params: Vec::new(),
            parameters: parameters.into_iter().collect(),
            returns,
            accessors: None,
            markers: MemberMarkers::default(),
            location: None,
        }
    }

    /// Creates a public property with a public getter and optional public setter.
    #[must_use]
    pub fn property(name: impl Into<String>, ty: TypeRef, settable: bool) -> Self {
        let mut member = Self::method(name, Vec::new(), ty);
        member.kind = MemberKind::Property;
        member.accessors = Some(PropertyAccessors {
            get: Some(Accessibility::Public),
            set: settable.then_some(Accessibility::Public),
        });
        member
    }

    /// Creates a member of an arbitrary kind with no parameters.
    #[must_use]
    pub fn of_kind(kind: MemberKind, name: impl Into<String>, ty: TypeRef) -> Self {
        let mut member = Self::method(name, Vec::new(), ty);
        member.kind = kind;
        member
    }

    /// Returns the asynchronous classification of the return shape.
    #[must_use]
    pub fn async_shape(&self) -> AsyncShape {
        self.returns.async_shape()
    }

    /// Returns true for properties that declare parameters.
    #[must_use]
    pub fn is_indexer(&self) -> bool {
        self.kind == MemberKind::Property && !self.parameters.is_empty()
    }

    /// Returns true for properties that declare a setter.
    #[must_use]
    pub fn is_settable(&self) -> bool {
        self.kind == MemberKind::Property
            && self.accessors.is_some_and(|accessors| accessors.set.is_some())
    }

    /// Returns true when the member declares its own type parameters.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Returns true when subtypes may override the member.
    #[must_use]
    pub const fn is_overridable(&self) -> bool {
        self.is_virtual || self.is_abstract
    }
}
