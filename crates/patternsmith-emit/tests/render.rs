// crates/patternsmith-emit/tests/render.rs
// ============================================================================
// Module: Renderer Tests
// Description: Integration tests for rendered Rust source per pattern family.
// Purpose: Validate artifact naming, member order, hooks, and chain nesting.
// Dependencies: patternsmith-core, patternsmith-emit
// ============================================================================

//! ## Overview
//! Drives catalogs through the core synthesizer with [`RustRenderer`] and
//! checks the emitted text for the shapes each pattern family promises.

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

use std::error::Error;

use patternsmith_core::CacheStorage;
use patternsmith_core::DiagnosticKind;
use patternsmith_core::EvictionPolicy;
use patternsmith_core::PatternKind;
use patternsmith_core::SourceArtifact;
use patternsmith_core::SynthesisOptions;
use patternsmith_core::SynthesisOutcome;
use patternsmith_core::SynthesisRequest;
use patternsmith_core::Synthesizer;
use patternsmith_core::TypeCatalog;
use patternsmith_core::UnmappedPolicy;
use patternsmith_emit::GENERATED_MARKER;
use patternsmith_emit::RustRenderer;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

type TestResult<T = ()> = Result<T, Box<dyn Error>>;

const CATALOG: &str = r#"{
  "types": [
    {
      "name": "app::ILogger",
      "kind": "interface",
      "members": [
        { "kind": "method", "name": "Log", "parameters": [{ "name": "message", "type": "String" }] },
        { "kind": "method", "name": "Flush", "returns": "BoxFuture<()>", "markers": { "ignore": true } },
        { "kind": "property", "name": "Level", "returns": "u8", "accessors": { "get": "public", "set": "public" } }
      ]
    },
    {
      "name": "app::IPricing",
      "kind": "interface",
      "members": [
        { "kind": "method", "name": "Quote", "parameters": [{ "name": "sku", "type": "String" }], "returns": "f64" },
        { "kind": "method", "name": "Fetch", "parameters": [{ "name": "sku", "type": "String" }], "returns": "BoxFuture<Item>" },
        { "kind": "method", "name": "Refresh" }
      ]
    },
    {
      "name": "app::PriceTable",
      "kind": "class",
      "members": [
        { "kind": "method", "name": "PriceOf", "parameters": [{ "name": "sku", "type": "String" }], "returns": "f64" },
        { "kind": "method", "name": "Load", "parameters": [{ "name": "sku", "type": "String" }], "returns": "Item" }
      ]
    },
    {
      "name": "app::Handler",
      "kind": "class",
      "extensible": true,
      "members": [
        {
          "kind": "method", "name": "Ten",
          "parameters": [{ "name": "input", "type": "Request" }, { "name": "next", "type": "Next" }],
          "returns": "Response", "markers": { "step": { "rank": 10 } }
        },
        {
          "kind": "method", "name": "Five",
          "parameters": [{ "name": "input", "type": "Request" }, { "name": "next", "type": "Next" }],
          "returns": "BoxFuture<Response>", "markers": { "step": { "rank": 5 } }
        },
        {
          "kind": "method", "name": "Handle",
          "parameters": [{ "name": "input", "type": "Request" }, { "name": "cancel", "type": "CancellationToken" }],
          "returns": "Response", "markers": { "terminal": true }
        }
      ]
    },
    {
      "name": "app::Router",
      "kind": "struct",
      "extensible": true,
      "semantics": "value",
      "members": [
        {
          "kind": "method", "name": "Auth",
          "parameters": [{ "name": "input", "type": "Request" }, { "name": "next", "type": "Next" }],
          "returns": "Response", "markers": { "step": { "rank": 1 } }
        },
        {
          "kind": "method", "name": "Serve",
          "parameters": [{ "name": "input", "type": "Request" }],
          "returns": "Response", "markers": { "terminal": true }
        }
      ]
    }
  ]
}"#;

fn synthesize(catalog: &str, target: &str, options: SynthesisOptions) -> TestResult<SynthesisOutcome> {
    let catalog = TypeCatalog::from_json(catalog.as_bytes())?;
    let synthesizer = Synthesizer::new(&catalog, RustRenderer::new());
    Ok(synthesizer.synthesize(&SynthesisRequest::new("job", target, options))?)
}

fn render(target: &str, options: SynthesisOptions) -> TestResult<SourceArtifact> {
    let outcome = synthesize(CATALOG, target, options)?;
    if outcome.has_errors() {
        return Err(format!("unexpected diagnostics: {:?}", outcome.diagnostics).into());
    }
    outcome.artifacts.into_iter().next().ok_or_else(|| "missing artifact".into())
}

fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into().into()) }
}

fn position(text: &str, needle: &str) -> TestResult<usize> {
    text.find(needle).ok_or_else(|| format!("missing `{needle}` in:\n{text}").into())
}

// ============================================================================
// SECTION: Forwarding
// ============================================================================

#[test]
fn decorator_forwards_in_surface_order_with_hooks() -> TestResult {
    let artifact = render("app::ILogger", SynthesisOptions::new(PatternKind::Decorator))?;
    let text = &artifact.text;
    ensure(artifact.name == "logger_decorator.rs", artifact.name.clone())?;
    ensure(text.starts_with("// This file is @generated"), "generated marker first")?;
    ensure(text.contains(GENERATED_MARKER), "marker present")?;
    ensure(
        text.contains("impl<T: app::ILogger, D: LoggerDecoration> app::ILogger for LoggerDecorator<T, D>"),
        text.clone(),
    )?;
    let flush = position(text, "fn flush(&self) -> BoxFuture<()>")?;
    let log = position(text, "fn log(&self, message: String)")?;
    let level = position(text, "fn level(&self) -> u8")?;
    ensure(flush < log && log < level, "members follow signature-key order")?;
    ensure(!text.contains("decorate(\"Flush\")"), "ignored members skip the hook")?;
    ensure(text.contains("self.decoration.decorate(\"Log\");"), "log is decorated")?;
    ensure(text.contains("fn set_level(&mut self, value: u8)"), "setter forwarded")?;
    Ok(())
}

#[test]
fn proxy_intercepts_before_and_after() -> TestResult {
    let artifact = render("app::ILogger", SynthesisOptions::new(PatternKind::Proxy))?;
    let text = &artifact.text;
    ensure(artifact.name == "logger_proxy.rs", artifact.name.clone())?;
    ensure(text.contains("pub trait LoggerInterceptor"), "interceptor trait")?;
    let before = position(text, "self.interceptor.before(\"Log\");")?;
    let call = position(text, "self.inner.log(message);")?;
    let after = position(text, "self.interceptor.after(\"Log\");")?;
    ensure(before < call && call < after, "hooks surround the call")?;
    Ok(())
}

#[test]
fn cached_factory_memoises_sync_results_only() -> TestResult {
    let mut options = SynthesisOptions::new(PatternKind::CachedFactory);
    options.cache.storage = CacheStorage::Concurrent;
    options.cache.eviction = EvictionPolicy::Lru;
    options.cache.capacity = Some(64);
    let artifact = render("app::IPricing", options)?;
    let text = &artifact.text;
    ensure(artifact.name == "pricing_cache.rs", artifact.name.clone())?;
    ensure(
        text.contains("quote_cache: ::std::sync::Mutex<CacheSlot<(String,), f64>>,"),
        text.clone(),
    )?;
    ensure(!text.contains("fetch_cache"), "async members are not memoised")?;
    ensure(!text.contains("refresh_cache"), "unit members are not memoised")?;
    ensure(text.contains("CacheSlot::new(Some(64))"), "capacity applied")?;
    ensure(text.contains("let key = (sku.clone(),);"), "argument tuple key")?;
    Ok(())
}

// ============================================================================
// SECTION: Facade
// ============================================================================

#[test]
fn facade_delegates_adapts_and_stubs() -> TestResult {
    let mut options = SynthesisOptions::new(PatternKind::Facade);
    options.sources = vec!["app::PriceTable".to_string()];
    options.unmapped = Some(UnmappedPolicy::Stub);
    options.adapt_async = true;
    let artifact = render("app::IPricing", options)?;
    let text = &artifact.text;
    ensure(artifact.name == "pricing_facade.rs", artifact.name.clone())?;
    ensure(text.contains("price_table: app::PriceTable,"), "source field")?;
    ensure(text.contains("self.price_table.price_of(sku)"), "structural binding")?;
    ensure(
        text.contains("Box::pin(::std::future::ready(self.price_table.load(sku)))"),
        "sync candidate wrapped in a completed handle",
    )?;
    ensure(text.contains("unimplemented!(\"`Refresh` of `app::IPricing`"), "refresh stubbed")?;
    Ok(())
}

const SETTABLE_CATALOG: &str = r#"{
  "types": [
    {
      "name": "app::IConfig",
      "kind": "interface",
      "members": [
        { "kind": "property", "name": "Level", "returns": "u8", "accessors": { "get": "public", "set": "public" } }
      ]
    },
    {
      "name": "app::Table",
      "kind": "class",
      "members": [
        { "kind": "property", "name": "Level", "returns": "u8", "accessors": { "get": "public" } }
      ]
    }
  ]
}"#;

#[test]
fn facade_over_read_only_source_reports_the_missing_setter() -> TestResult {
    let mut options = SynthesisOptions::new(PatternKind::Facade);
    options.sources = vec!["app::Table".to_string()];
    let outcome = synthesize(SETTABLE_CATALOG, "app::IConfig", options.clone())?;
    ensure(outcome.artifacts.is_empty(), "unmapped setter suppresses the artifact")?;
    ensure(
        outcome.diagnostics.iter().any(|diagnostic| diagnostic.kind == DiagnosticKind::UnmappedMember),
        format!("expected an unmapped setter: {:?}", outcome.diagnostics),
    )?;

    options.unmapped = Some(UnmappedPolicy::Stub);
    let outcome = synthesize(SETTABLE_CATALOG, "app::IConfig", options)?;
    let text = &outcome.artifacts.first().ok_or("missing artifact")?.text;
    ensure(text.contains("self.table.level()"), "getter delegated")?;
    ensure(text.contains("unimplemented!(\"the setter of `Level`"), "setter stubbed")?;
    ensure(
        outcome.diagnostics.iter().any(|diagnostic| diagnostic.kind == DiagnosticKind::StubbedMember),
        "stub noted",
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Composition
// ============================================================================

#[test]
fn pipeline_nests_steps_by_rank_and_threads_cancellation() -> TestResult {
    let artifact = render("app::Handler", SynthesisOptions::new(PatternKind::Pipeline))?;
    let text = &artifact.text;
    ensure(artifact.name == "handler.rs", artifact.name.clone())?;
    ensure(text.contains("impl app::Handler {"), "inherent impl on the host")?;
    ensure(
        text.contains(
            "pub async fn execute(&self, input: Request, cancel: CancellationToken) -> Response"
        ),
        text.clone(),
    )?;
    ensure(text.contains("Execution order: `Five` -> `Ten` -> `Handle`."), "documented order")?;
    ensure(text.contains("let host = self;"), "reference hosts captured directly")?;
    let outer = position(text, "host.five(input, next).await")?;
    let middle = position(text, "host.ten(input, next)")?;
    ensure(middle < outer, "outer call closes the chain")?;
    ensure(
        text.contains("let next = move |input| ::futures::executor::block_on(async move {"),
        "sync step in an async chain blocks on the rest of the chain",
    )?;
    ensure(text.contains("host.handle(input, cancel.clone())"), "token passed to the terminal")?;
    Ok(())
}

#[test]
fn chain_of_responsibility_snapshots_value_hosts() -> TestResult {
    let artifact = render("app::Router", SynthesisOptions::new(PatternKind::ChainOfResponsibility))?;
    let text = &artifact.text;
    ensure(text.contains("pub fn dispatch(&self, input: Request) -> Response"), text.clone())?;
    ensure(text.contains("let snapshot = self.clone();"), "value hosts are snapshotted")?;
    ensure(text.contains("host.auth(input, next)"), "handler receives next")?;
    Ok(())
}

#[test]
fn custom_header_lines_follow_the_marker() -> TestResult {
    let catalog = TypeCatalog::from_json(CATALOG.as_bytes())?;
    let renderer = RustRenderer::new().with_header("Copyright Example\nRegenerate with patternsmith");
    let synthesizer = Synthesizer::new(&catalog, renderer);
    let outcome = synthesizer.synthesize(&SynthesisRequest::new(
        "job",
        "app::ILogger",
        SynthesisOptions::new(PatternKind::Decorator),
    ))?;
    let text = &outcome.artifacts.first().ok_or("missing artifact")?.text;
    let lines: Vec<&str> = text.lines().take(4).collect();
    ensure(
        lines
            == vec![
                "// This file is @generated by patternsmith. DO NOT EDIT.",
                "// Source: app::ILogger (decorator)",
                "// Copyright Example",
                "// Regenerate with patternsmith",
            ],
        format!("unexpected header {lines:?}"),
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Inherited Surfaces
// ============================================================================

fn diamond_catalog(interfaces: &str) -> String {
    format!(
        r#"{{
  "types": [
    {{ "name": "app::IA", "kind": "interface",
       "members": [{{ "kind": "method", "name": "Get", "parameters": [{{ "name": "left", "type": "i32" }}], "returns": "i32" }}] }},
    {{ "name": "app::IB", "kind": "interface",
       "members": [{{ "kind": "method", "name": "Get", "parameters": [{{ "name": "right", "type": "i32" }}], "returns": "i32" }}] }},
    {{ "name": "app::IC", "kind": "interface", "interfaces": {interfaces} }}
  ]
}}"#
    )
}

#[test]
fn supertype_listing_order_does_not_change_rendered_text() -> TestResult {
    let mut texts = Vec::new();
    for interfaces in [r#"["app::IA", "app::IB"]"#, r#"["app::IB", "app::IA"]"#] {
        let outcome = synthesize(
            &diamond_catalog(interfaces),
            "app::IC",
            SynthesisOptions::new(PatternKind::Decorator),
        )?;
        ensure(outcome.diagnostics.is_empty(), format!("{:?}", outcome.diagnostics))?;
        texts.push(outcome.artifacts.first().ok_or("missing artifact")?.text.clone());
    }
    ensure(texts[0] == texts[1], "rendered text depends on supertype order")?;
    ensure(texts[0].contains("fn get(&self, left: i32) -> i32"), texts[0].clone())?;
    Ok(())
}
