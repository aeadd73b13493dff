// crates/patternsmith-core/tests/chain.rs
// ============================================================================
// Module: Chain Synthesizer Tests
// Description: Nesting, capture, and bridge selection tests.
// ============================================================================
//! ## Overview
//! Integration tests that fold validated plans into continuation chains.

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

mod support;

use patternsmith_core::Bridge;
use patternsmith_core::Chain;
use patternsmith_core::ChainSynthesizer;
use patternsmith_core::CompositionHost;
use patternsmith_core::CompositionPlanner;
use patternsmith_core::Continuation;
use patternsmith_core::DiagnosticSink;
use patternsmith_core::ExecutionMode;
use patternsmith_core::HostCapture;
use patternsmith_core::MemberDescriptor;
use patternsmith_core::PatternKind;
use patternsmith_core::SynthesisOptions;
use patternsmith_core::TypeDecl;
use patternsmith_core::TypeKind;
use support::TestResult;
use support::catalog;
use support::ensure;
use support::step;
use support::terminal;

// ========================================================================
// Test Helpers
// ========================================================================

/// Plans and folds a host declaration.
fn chain_for(host: TypeDecl) -> TestResult<Chain> {
    let name = host.name.clone();
    let catalog = catalog(vec![host])?;
    let options = SynthesisOptions::new(PatternKind::ChainOfResponsibility);
    let mut sink = DiagnosticSink::new();
    let host = CompositionHost::capture(&catalog, &name, &mut sink).ok_or("capture")?;
    let plan = CompositionPlanner::new(&options).plan(&host, &mut sink).ok_or("plan")?;
    Ok(ChainSynthesizer.synthesize(&plan))
}

/// Builds an extensible class host with the given members.
fn host(kind: TypeKind, members: Vec<MemberDescriptor>) -> TypeDecl {
    members
        .into_iter()
        .fold(TypeDecl::new("Host", kind).extensible(), TypeDecl::with_member)
}

// ============================================================================
// SECTION: Nesting
// ============================================================================

#[test]
fn ranks_ten_and_five_execute_five_then_ten_then_terminal() -> TestResult {
    let chain = chain_for(host(
        TypeKind::Class,
        vec![
            step("Ten", 10, "Request", "Response"),
            step("Five", 5, "Request", "Response"),
            terminal("Handle", "Request", "Response"),
        ],
    ))?;
    ensure(
        chain.execution_order() == vec!["Five", "Ten", "Handle"],
        format!("unexpected order {:?}", chain.execution_order()),
    )?;
    ensure(chain.depth() == 3, "two steps plus the terminal")?;
    let ranks: Vec<Option<i32>> =
        chain.invocations().iter().map(|invocation| invocation.rank).collect();
    ensure(ranks == vec![Some(5), Some(10), None], "terminal has no rank")?;
    Ok(())
}

#[test]
fn innermost_continuation_is_the_terminal() -> TestResult {
    let chain = chain_for(host(
        TypeKind::Class,
        vec![step("Only", 1, "Request", "Response"), terminal("Handle", "Request", "Response")],
    ))?;
    let next = chain.entry.next().ok_or("entry should wrap the terminal")?;
    ensure(matches!(next, Continuation::Terminal { .. }), "terminal is innermost")?;
    ensure(next.next().is_none(), "terminal has no next")?;
    Ok(())
}

// ============================================================================
// SECTION: Capture and Bridges
// ============================================================================

#[test]
fn value_hosts_are_captured_as_snapshots() -> TestResult {
    let members = || {
        vec![step("Only", 1, "Request", "Response"), terminal("Handle", "Request", "Response")]
    };
    let by_value = chain_for(host(TypeKind::Struct, members()))?;
    let by_reference = chain_for(host(TypeKind::Class, members()))?;
    ensure(by_value.capture == HostCapture::Snapshot, "structs are snapshotted")?;
    ensure(by_reference.capture == HostCapture::Direct, "classes are captured directly")?;
    Ok(())
}

#[test]
fn sync_participants_complete_immediately_in_async_chains() -> TestResult {
    let chain = chain_for(host(
        TypeKind::Class,
        vec![
            step("Slow", 1, "Request", "Future<Response>"),
            step("Fast", 2, "Request", "Response"),
            terminal("Handle", "Request", "Response"),
        ],
    ))?;
    ensure(chain.mode == ExecutionMode::Async, "one async step makes the chain async")?;
    let bridges: Vec<Bridge> =
        chain.invocations().iter().map(|invocation| invocation.bridge).collect();
    ensure(
        bridges == vec![Bridge::None, Bridge::CompleteImmediately, Bridge::CompleteImmediately],
        format!("unexpected bridges {bridges:?}"),
    )?;
    Ok(())
}

#[test]
fn block_on_bridges_async_participants_in_sync_chains() {
    assert_eq!(
        Bridge::for_participant(patternsmith_core::AsyncShape::AsyncWithResult, ExecutionMode::Sync),
        Bridge::BlockOn
    );
    assert_eq!(
        Bridge::for_participant(patternsmith_core::AsyncShape::Sync, ExecutionMode::Sync),
        Bridge::None
    );
}
