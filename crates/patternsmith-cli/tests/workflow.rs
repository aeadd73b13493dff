// crates/patternsmith-cli/tests/workflow.rs
// ============================================================================
// Module: CLI Workflow Tests
// Description: End-to-end generate, check, and analyze runs on temp dirs.
// Purpose: Validate job isolation, drift detection, and report determinism.
// Dependencies: patternsmith-cli, tempfile
// ============================================================================

//! ## Overview
//! Each test writes a catalog and a `patternsmith.toml` into a temporary
//! directory and drives the library workflow the binary uses.

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
use std::fs;
use std::path::Path;

use patternsmith_cli::CliError;
use patternsmith_cli::InputOverrides;
use patternsmith_cli::REPORT_FILE_NAME;
use patternsmith_cli::RunInputs;
use patternsmith_core::SynthesisModel;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

type TestResult = Result<(), Box<dyn Error>>;

const CATALOG: &str = r#"{
  "types": [
    {
      "name": "app::ILogger",
      "kind": "interface",
      "members": [
        { "kind": "method", "name": "Log", "parameters": [{ "name": "message", "type": "String" }] }
      ]
    },
    {
      "name": "app::Handler",
      "kind": "class",
      "extensible": true,
      "members": [
        {
          "kind": "method", "name": "Audit",
          "parameters": [{ "name": "input", "type": "Request" }, { "name": "next", "type": "Next" }],
          "returns": "Response", "markers": { "step": { "rank": 1 } }
        },
        {
          "kind": "method", "name": "Handle",
          "parameters": [{ "name": "input", "type": "Request" }],
          "returns": "Response", "markers": { "terminal": true }
        }
      ]
    }
  ]
}"#;

const CONFIG: &str = r#"
[catalog]
path = "catalog.json"

[output]
dir = "generated"

[[job]]
name = "logger"
contract = "app::ILogger"
pattern = "decorator"

[[job]]
name = "handler"
host = "app::Handler"
pattern = "pipeline"

[[job]]
name = "missing"
contract = "app::IMissing"
pattern = "proxy"
"#;

fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into().into()) }
}

fn workspace(config: &str) -> Result<(TempDir, InputOverrides), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("catalog.json"), CATALOG)?;
    let config_path = dir.path().join("patternsmith.toml");
    fs::write(&config_path, config)?;
    let overrides = InputOverrides {
        config: Some(config_path),
        ..InputOverrides::default()
    };
    Ok((dir, overrides))
}

fn generated(dir: &Path, name: &str) -> std::path::PathBuf {
    dir.join("generated").join(name)
}

// ============================================================================
// SECTION: Generate
// ============================================================================

#[test]
fn generate_writes_clean_jobs_and_reports_failed_ones() -> TestResult {
    let (dir, overrides) = workspace(CONFIG)?;
    let inputs = RunInputs::load(&overrides)?;
    let run = patternsmith_cli::generate(&inputs)?;

    ensure(!run.is_clean(), "the unresolved contract must fail the run")?;
    ensure(run.report.error_count() == 1, format!("errors: {}", run.report.error_count()))?;
    let decorator = fs::read_to_string(generated(dir.path(), "logger_decorator.rs"))?;
    ensure(decorator.contains("pub struct LoggerDecorator"), "decorator written")?;
    let pipeline = fs::read_to_string(generated(dir.path(), "handler.rs"))?;
    ensure(pipeline.contains("pub fn execute(&self, input: Request) -> Response"), pipeline.clone())?;
    ensure(!generated(dir.path(), "missing_proxy.rs").exists(), "failed job writes nothing")?;

    let report = fs::read(generated(dir.path(), REPORT_FILE_NAME))?;
    ensure(report == run.report_json, "report written as canonical json")?;
    let text = String::from_utf8(report)?;
    ensure(text.contains("\"id\":\"PSM001\""), "report lists the unresolved contract")?;
    Ok(())
}

#[test]
fn repeated_runs_write_identical_reports() -> TestResult {
    let (_dir, overrides) = workspace(CONFIG)?;
    let inputs = RunInputs::load(&overrides)?;
    let first = patternsmith_cli::generate(&inputs)?;
    let second = patternsmith_cli::generate(&inputs)?;
    ensure(first.report_json == second.report_json, "reports differ between runs")?;
    Ok(())
}

#[test]
fn overrides_replace_configured_locations() -> TestResult {
    let (dir, mut overrides) = workspace(CONFIG)?;
    let elsewhere = dir.path().join("elsewhere");
    overrides.out = Some(elsewhere.clone());
    let inputs = RunInputs::load(&overrides)?;
    patternsmith_cli::generate(&inputs)?;
    ensure(elsewhere.join("logger_decorator.rs").exists(), "override directory used")?;
    ensure(!generated(dir.path(), "logger_decorator.rs").exists(), "configured dir unused")?;
    Ok(())
}

// ============================================================================
// SECTION: Check
// ============================================================================

#[test]
fn check_detects_drift_after_manual_edits() -> TestResult {
    let (dir, overrides) = workspace(CONFIG)?;
    let inputs = RunInputs::load(&overrides)?;

    let before = patternsmith_cli::check(&inputs)?;
    ensure(before.drifted.len() == 3, format!("expected all outputs missing: {:?}", before.drifted))?;

    patternsmith_cli::generate(&inputs)?;
    let clean = patternsmith_cli::check(&inputs)?;
    ensure(clean.drifted.is_empty(), format!("unexpected drift: {:?}", clean.drifted))?;

    let edited = generated(dir.path(), "handler.rs");
    fs::write(&edited, "// hand edited\n")?;
    let after = patternsmith_cli::check(&inputs)?;
    ensure(after.drifted == vec![edited], format!("unexpected drift: {:?}", after.drifted))?;
    Ok(())
}

// ============================================================================
// SECTION: Analyze
// ============================================================================

#[test]
fn analyze_returns_the_composition_plan() -> TestResult {
    let (_dir, overrides) = workspace(CONFIG)?;
    let inputs = RunInputs::load(&overrides)?;
    let outcome = patternsmith_cli::analyze(&inputs, "handler")?;
    let Some(SynthesisModel::Composition(model)) = &outcome.model else {
        return Err(format!("expected a composition model: {:?}", outcome.model).into());
    };
    ensure(model.chain.execution_order() == vec!["Audit", "Handle"], "execution order")?;
    Ok(())
}

#[test]
fn analyze_rejects_unknown_jobs() -> TestResult {
    let (_dir, overrides) = workspace(CONFIG)?;
    let inputs = RunInputs::load(&overrides)?;
    match patternsmith_cli::analyze(&inputs, "absent") {
        Err(CliError::UnknownJob(name)) => ensure(name == "absent", name),
        other => Err(format!("expected unknown job, got {other:?}").into()),
    }
}

// ============================================================================
// SECTION: Input Failures
// ============================================================================

#[test]
fn colliding_artifacts_fail_the_run() -> TestResult {
    let config = r#"
[catalog]
path = "catalog.json"

[[job]]
name = "first"
contract = "app::ILogger"
pattern = "decorator"

[[job]]
name = "second"
contract = "app::ILogger"
pattern = "proxy"
type_name = "LoggerDecorator"
"#;
    let (_dir, overrides) = workspace(config)?;
    let inputs = RunInputs::load(&overrides)?;
    match patternsmith_cli::generate(&inputs) {
        Err(CliError::ArtifactCollision {
            artifact,
            first,
            second,
        }) => ensure(
            artifact == "logger_decorator.rs" && first == "first" && second == "second",
            format!("{artifact} {first} {second}"),
        ),
        other => Err(format!("expected a collision, got {other:?}").into()),
    }
}

#[test]
fn missing_catalog_is_a_catalog_error() -> TestResult {
    let (dir, mut overrides) = workspace(CONFIG)?;
    overrides.catalog = Some(dir.path().join("absent.json"));
    match RunInputs::load(&overrides) {
        Err(CliError::Catalog {
            ..
        }) => Ok(()),
        other => Err(format!("expected a catalog error, got {other:?}").into()),
    }
}

// ============================================================================
// SECTION: Demo Workspace
// ============================================================================

#[test]
fn demo_configuration_generates_cleanly() -> TestResult {
    let out = tempfile::tempdir()?;
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    let overrides = InputOverrides {
        config: Some(demos.join("patternsmith.toml")),
        catalog: None,
        out: Some(out.path().to_path_buf()),
    };
    let inputs = RunInputs::load(&overrides)?;
    let run = patternsmith_cli::generate(&inputs)?;
    ensure(run.is_clean(), format!("demo diagnostics: {:?}", run.report))?;
    let mut names: Vec<&str> = run.artifacts().map(|artifact| artifact.name.as_str()).collect();
    names.sort_unstable();
    ensure(
        names
            == vec![
                "checkout.rs",
                "logger_decorator.rs",
                "logger_proxy.rs",
                "pricing_cache.rs",
                "pricing_facade.rs",
            ],
        format!("unexpected artifacts {names:?}"),
    )?;
    let checkout = fs::read_to_string(out.path().join("checkout.rs"))?;
    ensure(
        checkout.contains("Execution order: `validation` -> `Price` -> `Submit`."),
        checkout.clone(),
    )?;
    Ok(())
}
