// crates/patternsmith-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers and catalog builders for core tests.
// ============================================================================
//! ## Overview
//! Result-based assertion helpers, compact declaration builders, and a
//! listing renderer that makes artifact text reflect member and chain order.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]
#![allow(dead_code, reason = "Each integration test binary uses a subset of the helpers.")]

use std::error::Error;
use std::fmt;

use patternsmith_core::ArtifactRenderer;
use patternsmith_core::DiagnosticKind;
use patternsmith_core::MemberDescriptor;
use patternsmith_core::Parameter;
use patternsmith_core::RenderError;
use patternsmith_core::SourceArtifact;
use patternsmith_core::StepMarker;
use patternsmith_core::SynthesisModel;
use patternsmith_core::TypeCatalog;
use patternsmith_core::TypeDecl;
use patternsmith_core::TypeRef;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across core integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition {
        Ok(())
    } else {
        Err(Box::new(TestError {
            message: message.into(),
        }))
    }
}

/// Returns the diagnostic kinds recorded, in order.
pub fn kinds<'a>(diagnostics: impl IntoIterator<Item = &'a patternsmith_core::Diagnostic>) -> Vec<DiagnosticKind> {
    diagnostics.into_iter().map(|diagnostic| diagnostic.kind).collect()
}

// ========================================================================
// Declaration Builders
// ========================================================================

/// Parses a compact type reference, falling back to a plain name.
pub fn ty(text: &str) -> TypeRef {
    TypeRef::parse(text).unwrap_or_else(|_| TypeRef::named(text))
}

/// Builds a public instance method.
pub fn method(name: &str, params: &[(&str, &str)], returns: &str) -> MemberDescriptor {
    MemberDescriptor::method(
        name,
        params.iter().map(|(param, kind)| Parameter::new(*param, ty(kind))).collect(),
        ty(returns),
    )
}

/// Builds a virtual method.
pub fn virtual_method(name: &str, returns: &str) -> MemberDescriptor {
    let mut member = method(name, &[], returns);
    member.is_virtual = true;
    member
}

/// Builds a step method `(input, next[, cancel])`.
pub fn step(name: &str, rank: i32, input: &str, returns: &str) -> MemberDescriptor {
    let mut member = method(name, &[("input", input), ("next", "Next")], returns);
    member.markers.step = Some(StepMarker {
        rank,
        name: None,
    });
    member
}

/// Builds a terminal method `(input)`.
pub fn terminal(name: &str, input: &str, returns: &str) -> MemberDescriptor {
    let mut member = method(name, &[("input", input)], returns);
    member.markers.terminal = true;
    member
}

/// Builds a catalog from declarations.
///
/// # Errors
/// Returns an error when two declarations share a name.
pub fn catalog(types: Vec<TypeDecl>) -> TestResult<TypeCatalog> {
    Ok(TypeCatalog::from_types(types)?)
}

// ========================================================================
// Listing Renderer
// ========================================================================

/// Renders a model as a plain listing of emitted members or chain order.
pub struct ListingRenderer;

impl ArtifactRenderer for ListingRenderer {
    fn render(&self, model: &SynthesisModel) -> Result<Vec<SourceArtifact>, RenderError> {
        let mut text = format!("type {}\n", model.type_name());
        match model {
            SynthesisModel::Forwarding(forwarding) => {
                for member in &forwarding.members {
                    text.push_str(member.key.as_str());
                    text.push('\n');
                }
            }
            SynthesisModel::Facade(facade) => {
                for resolved in &facade.members {
                    text.push_str(resolved.member.key.as_str());
                    text.push('\n');
                }
            }
            SynthesisModel::Composition(composition) => {
                for name in composition.chain.execution_order() {
                    text.push_str(name);
                    text.push('\n');
                }
            }
        }
        Ok(vec![SourceArtifact {
            name: format!("{}.txt", model.type_name()),
            text,
        }])
    }
}
