// crates/patternsmith-core/src/core/options.rs
// ============================================================================
// Module: Synthesis Options
// Description: The fixed option set accepted at the input boundary.
// Purpose: Model per-job knobs and reject contradictory combinations early.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Options arrive already collected (from a configuration file or a marker
//! parser). They are validated before any analysis runs; every conflict is a
//! Configuration-class diagnostic anchored on the job's target type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::contract::TypeCatalog;
use crate::core::diagnostics::DiagnosticKind;
use crate::core::diagnostics::DiagnosticSink;
use crate::core::diagnostics::SourceAnchor;

// ============================================================================
// SECTION: Pattern Kinds
// ============================================================================

/// Algorithm family shared by a group of patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternFamily {
    /// Walker and classifier, then member forwarding.
    Forwarding,
    /// Walker and classifier, then binding resolution.
    Matching,
    /// Composition planner, then chain synthesis.
    Composition,
}

/// Structural pattern to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Wrapper forwarding every member to an inner implementation.
    Decorator,
    /// Wrapper routing members through interception hooks.
    Proxy,
    /// Wrapper memoising synchronous results by argument tuple.
    CachedFactory,
    /// Implementation assembled from members of several source types.
    Facade,
    /// Ordered steps wrapping a terminal.
    Pipeline,
    /// Ordered handlers that may short-circuit before the terminal.
    ChainOfResponsibility,
}

impl PatternKind {
    /// Returns the algorithm family.
    #[must_use]
    pub const fn family(self) -> PatternFamily {
        match self {
            Self::Decorator | Self::Proxy | Self::CachedFactory => PatternFamily::Forwarding,
            Self::Facade => PatternFamily::Matching,
            Self::Pipeline | Self::ChainOfResponsibility => PatternFamily::Composition,
        }
    }

    /// Returns the stable configuration label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decorator => "decorator",
            Self::Proxy => "proxy",
            Self::CachedFactory => "cached_factory",
            Self::Facade => "facade",
            Self::Pipeline => "pipeline",
            Self::ChainOfResponsibility => "chain_of_responsibility",
        }
    }

    /// Suffix appended to the target name when no override is configured.
    const fn default_suffix(self) -> &'static str {
        match self {
            Self::Decorator => "Decorator",
            Self::Proxy => "Proxy",
            Self::CachedFactory => "Cache",
            Self::Facade => "Facade",
            Self::Pipeline => "Pipeline",
            Self::ChainOfResponsibility => "Chain",
        }
    }
}

// ============================================================================
// SECTION: Policy Enums
// ============================================================================

/// Rank-based wrap direction for composition steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingDirection {
    /// Lowest rank is outermost.
    #[default]
    OuterFirst,
    /// Highest rank is outermost.
    InnerFirst,
}

/// Async-generation tri-state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsyncGeneration {
    /// Async when any participant is async.
    #[default]
    Auto,
    /// Always async.
    ForceOn,
    /// Never async; async participants are an error.
    ForceOff,
}

/// Handling of contract members without an implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedPolicy {
    /// Report an Error.
    #[default]
    Error,
    /// Emit a stub raising a "not implemented" signal.
    Stub,
    /// Emit a default/no-op value silently.
    Ignore,
}

/// Severity of ambiguous bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Ambiguity blocks emission.
    #[default]
    Error,
    /// Ambiguity is reported as a non-blocking note.
    Note,
}

// ============================================================================
// SECTION: Cache Knobs
// ============================================================================

/// Storage mode for memoised results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStorage {
    /// Interior mutability without synchronization.
    #[default]
    SingleThreaded,
    /// Mutex-guarded storage.
    Concurrent,
}

/// Eviction policy for memoised results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Entries live as long as the cache.
    #[default]
    None,
    /// Least-recently-used eviction at a fixed capacity.
    Lru,
}

/// Pattern-specific knobs for cached construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheOptions {
    /// Storage mode.
    #[serde(default)]
    pub storage: CacheStorage,
    /// Eviction policy.
    #[serde(default)]
    pub eviction: EvictionPolicy,
    /// Maximum entries per member under LRU eviction.
    #[serde(default)]
    pub capacity: Option<u32>,
}

// ============================================================================
// SECTION: Synthesis Options
// ============================================================================

/// Per-job option record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisOptions {
    /// Pattern to synthesize.
    pub pattern: PatternKind,
    /// Generated artifact type name override.
    #[serde(default)]
    pub type_name: Option<String>,
    /// Composition wrap direction.
    #[serde(default)]
    pub ordering: OrderingDirection,
    /// Async-generation tri-state.
    #[serde(default)]
    pub async_generation: AsyncGeneration,
    /// Unmapped-member policy (Facade only).
    #[serde(default)]
    pub unmapped: Option<UnmappedPolicy>,
    /// Ambiguity severity policy.
    #[serde(default)]
    pub ambiguity: AmbiguityPolicy,
    /// Allows binding sync and async shapes to each other (Facade only).
    #[serde(default)]
    pub adapt_async: bool,
    /// Candidate source types in priority order (Facade only).
    #[serde(default)]
    pub sources: Vec<String>,
    /// Cache knobs (`CachedFactory` only).
    #[serde(default)]
    pub cache: CacheOptions,
}

impl SynthesisOptions {
    /// Creates default options for a pattern.
    #[must_use]
    pub const fn new(pattern: PatternKind) -> Self {
        Self {
            pattern,
            type_name: None,
            ordering: OrderingDirection::OuterFirst,
            async_generation: AsyncGeneration::Auto,
            unmapped: None,
            ambiguity: AmbiguityPolicy::Error,
            adapt_async: false,
            sources: Vec::new(),
            cache: CacheOptions {
                storage: CacheStorage::SingleThreaded,
                eviction: EvictionPolicy::None,
                capacity: None,
            },
        }
    }

    /// Returns the effective unmapped-member policy.
    #[must_use]
    pub fn unmapped_policy(&self) -> UnmappedPolicy {
        self.unmapped.unwrap_or_default()
    }

    /// Returns the generated type name for a target.
    ///
    /// Composition patterns extend the host itself, so the host name is used.
    #[must_use]
    pub fn artifact_type_name(&self, target: &str) -> String {
        if let Some(name) = &self.type_name {
            return name.clone();
        }
        let base = short_name(target);
        if self.pattern.family() == PatternFamily::Composition {
            return base.to_string();
        }
        let stem = strip_interface_prefix(base);
        format!("{stem}{}", self.pattern.default_suffix())
    }

    /// Validates option combinations, reporting Configuration diagnostics.
    ///
    /// Returns true when no Error was reported.
    pub fn validate(&self, target: &str, catalog: &TypeCatalog, sink: &mut DiagnosticSink) -> bool {
        let checkpoint = sink.checkpoint();
        let anchor = SourceAnchor::on_type(target, catalog.get(target).and_then(|decl| decl.location.clone()));
        let pattern = self.pattern.as_str().to_string();
        let not_applicable = |sink: &mut DiagnosticSink, option: &str| {
            sink.emit(
                DiagnosticKind::OptionNotApplicable,
                anchor.clone(),
                vec![option.to_string(), pattern.clone()],
            );
        };

        if let Some(name) = &self.type_name {
            if self.pattern.family() == PatternFamily::Composition {
                not_applicable(sink, "type_name");
            } else if !is_identifier(name) {
                sink.emit(DiagnosticKind::InvalidTypeName, anchor.clone(), vec![name.clone()]);
            }
        }
        if self.pattern.family() != PatternFamily::Composition {
            let generated = self.artifact_type_name(target);
            if generated == short_name(target) || generated == target {
                sink.emit(
                    DiagnosticKind::TypeNameClash,
                    anchor.clone(),
                    vec![generated, target.to_string()],
                );
            } else if catalog.contains(&generated) {
                sink.emit(
                    DiagnosticKind::TypeNameClash,
                    anchor.clone(),
                    vec![generated.clone(), generated],
                );
            }
        }

        if self.pattern == PatternKind::CachedFactory {
            match (self.cache.eviction, self.cache.capacity) {
                (EvictionPolicy::Lru, None | Some(0)) => sink.emit(
                    DiagnosticKind::ConflictingCachePolicy,
                    anchor.clone(),
                    vec!["lru eviction requires a positive capacity".to_string()],
                ),
                (EvictionPolicy::None, Some(_)) => sink.emit(
                    DiagnosticKind::ConflictingCachePolicy,
                    anchor.clone(),
                    vec!["capacity is only meaningful with lru eviction".to_string()],
                ),
                _ => {}
            }
        } else if self.cache != CacheOptions::default() {
            not_applicable(sink, "cache");
        }

        if self.pattern == PatternKind::Facade {
            if self.sources.is_empty() {
                sink.emit(
                    DiagnosticKind::MissingPatternInput,
                    anchor.clone(),
                    vec![pattern.clone(), "at least one source type".to_string()],
                );
            }
            for source in &self.sources {
                if !catalog.contains(source) {
                    sink.emit(
                        DiagnosticKind::UnresolvedType,
                        SourceAnchor::on_type(source, None),
                        vec![source.clone()],
                    );
                }
            }
        } else {
            if !self.sources.is_empty() {
                not_applicable(sink, "sources");
            }
            if self.unmapped.is_some() {
                not_applicable(sink, "unmapped");
            }
            if self.adapt_async {
                not_applicable(sink, "adapt_async");
            }
        }
        !sink.errors_since(checkpoint)
    }
}

// ============================================================================
// SECTION: Naming Helpers
// ============================================================================

/// Returns the last path segment of a qualified name.
#[must_use]
pub fn short_name(name: &str) -> &str {
    let after_colons = name.rsplit("::").next().unwrap_or(name);
    after_colons.rsplit('.').next().unwrap_or(after_colons)
}

/// Drops a conventional `I` prefix from capability-set names (`ILogger` -> `Logger`).
fn strip_interface_prefix(name: &str) -> &str {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some('I'), Some(next)) if next.is_ascii_uppercase() => &name[1 ..],
        _ => name,
    }
}

/// Returns true for a non-empty ASCII identifier that does not start with a digit.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        && name != "_"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_follow_pattern_suffix() {
        let options = SynthesisOptions::new(PatternKind::Decorator);
        assert_eq!(options.artifact_type_name("app::ILogger"), "LoggerDecorator");
        let options = SynthesisOptions::new(PatternKind::CachedFactory);
        assert_eq!(options.artifact_type_name("Index"), "IndexCache");
        let options = SynthesisOptions::new(PatternKind::Pipeline);
        assert_eq!(options.artifact_type_name("app.Checkout"), "Checkout");
    }

    #[test]
    fn identifiers_reject_leading_digits_and_punctuation() {
        assert!(is_identifier("LoggerProxy"));
        assert!(is_identifier("_Inner"));
        assert!(!is_identifier("9Lives"));
        assert!(!is_identifier("Bad-Name"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("_"));
    }
}
