// crates/patternsmith-emit/src/composition.rs
// ============================================================================
// Module: Composition Renderer
// Description: Pipeline and chain-of-responsibility entry-point rendering.
// Purpose: Emit the nested continuation chain as an inherent method on the host.
// Dependencies: patternsmith-core
// ============================================================================

//! ## Overview
//! The chain is emitted as one entry method on the host (`execute` for
//! pipelines, `dispatch` for chains of responsibility). Each step receives the
//! input and a `next` closure wrapping the rest of the chain.
//!
//! A `next` closure always matches the shape of the participant it is handed
//! to: async participants get a closure returning a future, sync participants
//! get a closure returning the output. Inside an async chain a sync
//! participant's `next` blocks on the remaining async chain.

// ============================================================================
// SECTION: Imports
// ============================================================================

use patternsmith_core::Bridge;
use patternsmith_core::Chain;
use patternsmith_core::CompositionModel;
use patternsmith_core::Continuation;
use patternsmith_core::ExecutionMode;
use patternsmith_core::HostCapture;
use patternsmith_core::Invocation;
use patternsmith_core::PatternKind;

use crate::writer::SourceWriter;
use crate::writer::identifier;
use crate::writer::snake_case;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Renders a composition model into the writer.
pub fn render(writer: &mut SourceWriter, model: &CompositionModel) {
    let chain = &model.chain;
    let (entry, summary) = match model.pattern {
        PatternKind::ChainOfResponsibility => (
            "dispatch",
            "Dispatches the input through the handler chain; any handler may answer without calling `next`.",
        ),
        _ => ("execute", "Runs the input through every pipeline step and the terminal."),
    };
    let order = chain
        .execution_order()
        .iter()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(" -> ");

    writer.open(format!("impl {}", chain.host));
    writer.doc(summary);
    writer.doc("");
    writer.doc(format!("Execution order: {order}."));
    let cancellation =
        chain.cancellation.as_ref().map(|token| format!(", cancel: {token}")).unwrap_or_default();
    let asyncness = match chain.mode {
        ExecutionMode::Async => "async ",
        ExecutionMode::Sync => "",
    };
    writer.open(format!(
        "pub {asyncness}fn {entry}(&self, input: {}{cancellation}) -> {}",
        chain.input, chain.output
    ));
    match chain.capture {
        HostCapture::Snapshot => {
            writer.line("let snapshot = self.clone();");
            writer.line("let host = &snapshot;");
        }
        HostCapture::Direct => writer.line("let host = self;"),
    }
    for line in continuation_lines(chain, &chain.entry) {
        writer.line(line);
    }
    writer.close();
    writer.close();
}

// ============================================================================
// SECTION: Continuations
// ============================================================================

/// Renders a continuation as an expression yielding the chain output.
///
/// The expression is valid in the chain's own context: inside the async
/// entry point (or an `async move` block) for async chains, or a plain
/// expression for sync chains.
fn continuation_lines(chain: &Chain, continuation: &Continuation) -> Vec<String> {
    let invocation = continuation.invocation();
    let method = identifier(&snake_case(&invocation.method));
    let mut arguments = vec!["input".to_string()];
    let mut lines = Vec::new();
    if let Some(next) = continuation.next() {
        arguments.push("next".to_string());
        lines.extend(next_closure(chain, invocation, next));
    }
    if invocation.takes_cancellation {
        arguments.push("cancel.clone()".to_string());
    }
    let call = format!("host.{method}({})", arguments.join(", "));
    lines.push(match invocation.bridge {
        Bridge::None if chain.mode == ExecutionMode::Async => format!("{call}.await"),
        Bridge::None | Bridge::CompleteImmediately => call,
        Bridge::BlockOn => format!("::futures::executor::block_on({call})"),
    });
    lines
}

/// Renders `let next = ...;` for the continuation handed to a participant.
fn next_closure(chain: &Chain, participant: &Invocation, next: &Continuation) -> Vec<String> {
    let capture_cancel = chain.cancellation.is_some();
    let mut lines = Vec::new();
    if capture_cancel {
        lines.push("let cancel_next = cancel.clone();".to_string());
    }
    let body = indent(continuation_lines(chain, next));
    let rebind = if capture_cancel { vec!["    let cancel = cancel_next;".to_string()] } else { Vec::new() };
    let (open, close) = match (participant.async_shape.is_async(), chain.mode) {
        (true, ExecutionMode::Async) => ("let next = move |input| async move {", "};"),
        (false, ExecutionMode::Async) => {
            ("let next = move |input| ::futures::executor::block_on(async move {", "});")
        }
        (true, ExecutionMode::Sync) => ("let next = move |input| ::std::future::ready({", "});"),
        (false, ExecutionMode::Sync) => ("let next = move |input| {", "};"),
    };
    lines.push(open.to_string());
    lines.extend(rebind);
    lines.extend(body);
    lines.push(close.to_string());
    lines
}

/// Indents rendered lines by one level.
fn indent(lines: Vec<String>) -> Vec<String> {
    lines.into_iter().map(|line| format!("    {line}")).collect()
}
