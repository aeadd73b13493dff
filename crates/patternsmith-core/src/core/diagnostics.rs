// crates/patternsmith-core/src/core/diagnostics.rs
// ============================================================================
// Module: Diagnostic Sink
// Description: Structured validation outcomes shared by every synthesis phase.
// Purpose: Accumulate diagnostics and govern abort/continue/warn behavior.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Diagnostics are accumulated, never thrown. Every phase reports into a
//! [`DiagnosticSink`]; the orchestrator checks the sink after each phase and
//! aborts emission for the whole contract once any Error has been recorded.
//!
//! Each [`DiagnosticKind`] carries a stable identifier (`PSMxxx`), a default
//! severity, a class from the error taxonomy, and a message template with
//! positional `{n}` parameters. Rendering for a console is left to callers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Severity and Class
// ============================================================================

/// Diagnostic severity.
///
/// # Invariants
/// - Declaration order is the report order (errors first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Aborts emission for the enclosing contract.
    Error,
    /// Excludes only the offending element.
    Warning,
    /// Advisory only.
    Info,
}

impl Severity {
    /// Returns a stable label for the severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Error taxonomy class for a diagnostic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticClass {
    /// Wrong contract variant, generic or nested contract, unresolved types.
    Structural,
    /// Unsupported or inaccessible members.
    Surface,
    /// Missing or ambiguous implementation bindings.
    Binding,
    /// Step ordering, terminal cardinality, async mode.
    Composition,
    /// Invalid options caught before analysis.
    Configuration,
}

// ============================================================================
// SECTION: Diagnostic Kinds
// ============================================================================

/// One validation rule; each rule has exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A referenced type is missing from the catalog.
    UnresolvedType,
    /// The contract is neither a capability set nor a partially-implemented base.
    WrongContractVariant,
    /// The contract declares type parameters.
    GenericContract,
    /// The contract is nested inside another type.
    NestedContract,
    /// The composition host is not an extension point.
    HostNotExtensible,
    /// The supertype graph contains a cycle.
    InheritanceCycle,
    /// The composition host is not a class or struct.
    WrongHostVariant,
    /// A member declares its own type parameters.
    GenericMember,
    /// A property declares parameters.
    IndexerMember,
    /// A nested type appears on the forwarded surface.
    NestedTypeMember,
    /// An event appears on the forwarded surface.
    EventMember,
    /// A member is unreachable through a contract-typed reference.
    InaccessibleMember,
    /// A property accessor is unreachable through a contract-typed reference.
    InaccessibleAccessor,
    /// Two supertypes declare the same member with different return shapes.
    ConflictingMember,
    /// The contract has nothing to forward.
    EmptySurface,
    /// No implementation was found for a contract member.
    UnmappedMember,
    /// Several implementations match a contract member.
    AmbiguousBinding,
    /// A binding widens the async surface beyond the configuration.
    AsyncWidening,
    /// A stub is emitted for an unmapped contract member.
    StubbedMember,
    /// The host declares no composition steps.
    NoSteps,
    /// The host declares no terminal step.
    MissingTerminal,
    /// The host declares more than one terminal step.
    DuplicateTerminal,
    /// Two or more steps share a rank.
    DuplicateRank,
    /// The plan is asynchronous but async generation is disabled.
    AsyncForbidden,
    /// A step's signature does not fit the plan.
    StepSignatureMismatch,
    /// The terminal's signature does not fit the plan.
    TerminalSignature,
    /// A configured generated type name is not an identifier.
    InvalidTypeName,
    /// A configured generated type name collides with an existing type.
    TypeNameClash,
    /// Cache knobs contradict each other.
    ConflictingCachePolicy,
    /// An option was supplied to a pattern it does not apply to.
    OptionNotApplicable,
    /// The pattern needs an input the options do not provide.
    MissingPatternInput,
}

impl DiagnosticKind {
    /// Returns the stable identifier for the rule.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::UnresolvedType => "PSM001",
            Self::WrongContractVariant => "PSM002",
            Self::GenericContract => "PSM003",
            Self::NestedContract => "PSM004",
            Self::HostNotExtensible => "PSM005",
            Self::InheritanceCycle => "PSM006",
            Self::WrongHostVariant => "PSM007",
            Self::GenericMember => "PSM010",
            Self::IndexerMember => "PSM011",
            Self::NestedTypeMember => "PSM012",
            Self::EventMember => "PSM013",
            Self::InaccessibleMember => "PSM014",
            Self::InaccessibleAccessor => "PSM015",
            Self::ConflictingMember => "PSM016",
            Self::EmptySurface => "PSM017",
            Self::UnmappedMember => "PSM030",
            Self::AmbiguousBinding => "PSM031",
            Self::AsyncWidening => "PSM032",
            Self::StubbedMember => "PSM033",
            Self::NoSteps => "PSM040",
            Self::MissingTerminal => "PSM041",
            Self::DuplicateTerminal => "PSM042",
            Self::DuplicateRank => "PSM043",
            Self::AsyncForbidden => "PSM044",
            Self::StepSignatureMismatch => "PSM045",
            Self::TerminalSignature => "PSM046",
            Self::InvalidTypeName => "PSM060",
            Self::TypeNameClash => "PSM061",
            Self::ConflictingCachePolicy => "PSM062",
            Self::OptionNotApplicable => "PSM063",
            Self::MissingPatternInput => "PSM064",
        }
    }

    /// Returns the taxonomy class.
    #[must_use]
    pub const fn class(self) -> DiagnosticClass {
        match self {
            Self::UnresolvedType
            | Self::WrongContractVariant
            | Self::GenericContract
            | Self::NestedContract
            | Self::HostNotExtensible
            | Self::InheritanceCycle
            | Self::WrongHostVariant => DiagnosticClass::Structural,
            Self::GenericMember
            | Self::IndexerMember
            | Self::NestedTypeMember
            | Self::EventMember
            | Self::InaccessibleMember
            | Self::InaccessibleAccessor
            | Self::ConflictingMember
            | Self::EmptySurface => DiagnosticClass::Surface,
            Self::UnmappedMember
            | Self::AmbiguousBinding
            | Self::AsyncWidening
            | Self::StubbedMember => DiagnosticClass::Binding,
            Self::NoSteps
            | Self::MissingTerminal
            | Self::DuplicateTerminal
            | Self::DuplicateRank
            | Self::AsyncForbidden
            | Self::StepSignatureMismatch
            | Self::TerminalSignature => DiagnosticClass::Composition,
            Self::InvalidTypeName
            | Self::TypeNameClash
            | Self::ConflictingCachePolicy
            | Self::OptionNotApplicable
            | Self::MissingPatternInput => DiagnosticClass::Configuration,
        }
    }

    /// Returns the default severity for the rule.
    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::InaccessibleMember | Self::InaccessibleAccessor | Self::AsyncWidening => {
                Severity::Warning
            }
            Self::EmptySurface | Self::StubbedMember => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// Returns the message template with positional `{n}` parameters.
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::UnresolvedType => "type `{0}` is not declared in the catalog",
            Self::WrongContractVariant => {
                "`{0}` is a {1}; contracts must be capability sets or partially-implemented bases"
            }
            Self::GenericContract => {
                "`{0}` declares {1} type parameter(s); generic contracts are not supported"
            }
            Self::NestedContract => "`{0}` is nested inside `{1}`; nested types are not supported",
            Self::HostNotExtensible => {
                "`{0}` is not an extension point; generated members cannot be merged into it"
            }
            Self::InheritanceCycle => "inheritance cycle detected at `{0}`",
            Self::WrongHostVariant => "`{0}` is a {1}; composition hosts must be classes or structs",
            Self::GenericMember => "member `{0}` declares type parameters and cannot be forwarded",
            Self::IndexerMember => "indexer `{0}` cannot be forwarded",
            Self::NestedTypeMember => "nested type `{0}` cannot be part of a forwarded surface",
            Self::EventMember => "event `{0}` cannot be forwarded; multicast delegation is not modelled",
            Self::InaccessibleMember => {
                "member `{0}` is {1} and unreachable through `{2}`; it is excluded"
            }
            Self::InaccessibleAccessor => {
                "the {1} accessor of property `{0}` is {2}; the property is excluded"
            }
            Self::ConflictingMember => {
                "member `{0}` is inherited with conflicting return types `{1}` and `{2}`"
            }
            Self::EmptySurface => "`{0}` exposes no forwardable members",
            Self::UnmappedMember => "no implementation found for contract member `{0}`",
            Self::AmbiguousBinding => {
                "contract member `{0}` matches {1} candidates ({2}); binding `{3}`"
            }
            Self::AsyncWidening => {
                "binding `{1}` for `{0}` is asynchronous but async generation is disabled"
            }
            Self::StubbedMember => "contract member `{0}` has no implementation; emitting a stub",
            Self::NoSteps => "`{0}` declares no composition steps",
            Self::MissingTerminal => "`{0}` declares no terminal step",
            Self::DuplicateTerminal => "`{0}` declares {1} terminal steps: {2}",
            Self::DuplicateRank => "steps {1} on `{0}` share rank {2}",
            Self::AsyncForbidden => {
                "`{0}` requires asynchronous composition ({1}) but async generation is disabled"
            }
            Self::StepSignatureMismatch => "step `{0}` {1}",
            Self::TerminalSignature => "terminal `{0}` {1}",
            Self::InvalidTypeName => "`{0}` is not a valid generated type name",
            Self::TypeNameClash => "generated type name `{0}` collides with `{1}`",
            Self::ConflictingCachePolicy => "cache options conflict: {0}",
            Self::OptionNotApplicable => "option `{0}` does not apply to the {1} pattern",
            Self::MissingPatternInput => "the {0} pattern requires {1}",
        }
    }
}

// ============================================================================
// SECTION: Source Anchors
// ============================================================================

/// File position of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path as reported by the host.
    pub path: String,
    /// One-based line number.
    pub line: u32,
    /// One-based column number.
    #[serde(default)]
    pub column: u32,
}

/// Location a diagnostic is reported against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceAnchor {
    /// Owning type name.
    pub type_name: String,
    /// Member name, when the diagnostic concerns a single member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    /// File position, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl SourceAnchor {
    /// Anchors a diagnostic on a type.
    #[must_use]
    pub fn on_type(type_name: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            type_name: type_name.into(),
            member: None,
            location,
        }
    }

    /// Anchors a diagnostic on a member of a type.
    #[must_use]
    pub fn on_member(
        type_name: impl Into<String>,
        member: impl Into<String>,
        location: Option<SourceLocation>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            member: Some(member.into()),
            location,
        }
    }
}

impl fmt::Display for SourceAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{}:{}:{}: ", location.path, location.line, location.column)?;
        }
        f.write_str(&self.type_name)?;
        if let Some(member) = &self.member {
            write!(f, "::{member}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Diagnostic
// ============================================================================

/// A single structured validation outcome.
///
/// # Invariants
/// - `args` fill the positional parameters of `kind.template()` in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Validation rule that produced the diagnostic.
    pub kind: DiagnosticKind,
    /// Effective severity (may differ from the default when downgraded).
    pub severity: Severity,
    /// Positional message parameters.
    pub args: Vec<String>,
    /// Source anchor.
    pub anchor: SourceAnchor,
}

impl Diagnostic {
    /// Creates a diagnostic with the kind's default severity.
    #[must_use]
    pub fn new(kind: DiagnosticKind, anchor: SourceAnchor, args: Vec<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            args,
            anchor,
        }
    }

    /// Overrides the severity.
    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Returns the stable rule identifier.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.kind.id()
    }

    /// Returns true for Error severity.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Renders the message template with the positional parameters.
    #[must_use]
    pub fn message(&self) -> String {
        let template = self.kind.template();
        let mut out = String::with_capacity(template.len() + 16);
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[.. open]);
            let after = &rest[open + 1 ..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open ..]);
                return out;
            };
            match after[.. close].parse::<usize>().ok().and_then(|index| self.args.get(index)) {
                Some(arg) => out.push_str(arg),
                None => out.push_str(&rest[open ..= open + close + 1]),
            }
            rest = &after[close + 1 ..];
        }
        out.push_str(rest);
        out
    }

    /// Sort key giving a deterministic report order.
    fn order_key(&self) -> (Severity, &'static str, &SourceAnchor, &[String]) {
        (self.severity, self.kind.id(), &self.anchor, &self.args)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {} [{}]", self.severity.as_str(), self.id(), self.message(), self.anchor)
    }
}

// ============================================================================
// SECTION: Diagnostic Sink
// ============================================================================

/// Accumulator threaded through every synthesis phase.
///
/// # Invariants
/// - Diagnostics are never removed; [`DiagnosticSink::checkpoint`] marks let a
///   phase ask whether it raised errors itself.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    /// Diagnostics in report order.
    diagnostics: Vec<Diagnostic>,
}

/// Position in the sink used to scope error checks to one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl DiagnosticSink {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    /// Records a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Records a diagnostic built from its parts with the default severity.
    pub fn emit(&mut self, kind: DiagnosticKind, anchor: SourceAnchor, args: Vec<String>) {
        self.report(Diagnostic::new(kind, anchor, args));
    }

    /// Returns a checkpoint at the current position.
    #[must_use]
    pub const fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.diagnostics.len())
    }

    /// Returns true when an error was recorded after the checkpoint.
    #[must_use]
    pub fn errors_since(&self, checkpoint: Checkpoint) -> bool {
        self.diagnostics.get(checkpoint.0 ..).is_some_and(|tail| tail.iter().any(Diagnostic::is_error))
    }

    /// Returns true when any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Returns the number of recorded errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.is_error()).count()
    }

    /// Returns the recorded diagnostics in report order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns the diagnostics sorted deterministically with duplicates removed.
    #[must_use]
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics;
        diagnostics.sort_by(|left, right| left.order_key().cmp(&right.order_key()));
        diagnostics.dedup();
        diagnostics
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
