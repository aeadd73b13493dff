//! Config loading and job validation tests for patternsmith-config.
// crates/patternsmith-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load and Job Validation Tests
// Description: Validate file loading limits and per-job invariants.
// Purpose: Ensure malformed configuration fails closed before analysis.
// =============================================================================

use std::fs;

use patternsmith_config::ConfigError;
use patternsmith_config::MAX_CONFIG_FILE_SIZE;
use patternsmith_config::MAX_JOBS;
use patternsmith_config::PatternsmithConfig;
use patternsmith_core::AsyncGeneration;
use patternsmith_core::CacheStorage;
use patternsmith_core::EvictionPolicy;
use patternsmith_core::OrderingDirection;
use patternsmith_core::PatternKind;
use patternsmith_core::UnmappedPolicy;

type TestResult = Result<(), String>;

const MINIMAL: &str = r#"
[[job]]
name = "logger"
contract = "app::ILogger"
pattern = "decorator"
"#;

fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn minimal_config_applies_defaults() -> TestResult {
    let config = PatternsmithConfig::from_toml_str(MINIMAL).map_err(|err| err.to_string())?;
    if config.catalog.path != "patternsmith-catalog.json" {
        return Err(format!("unexpected catalog default {}", config.catalog.path));
    }
    if config.output.dir != "generated" || config.output.header.is_some() {
        return Err("unexpected output defaults".to_string());
    }
    let job = config.job("logger").ok_or("missing job")?;
    let options = job.to_options();
    if options.pattern != PatternKind::Decorator
        || options.async_generation != AsyncGeneration::Auto
        || options.ordering != OrderingDirection::OuterFirst
        || options.unmapped.is_some()
    {
        return Err(format!("unexpected option defaults: {options:?}"));
    }
    Ok(())
}

#[test]
fn full_job_converts_into_a_request() -> TestResult {
    let text = r#"
[catalog]
path = "catalog/types.json"

[output]
dir = "src/generated"
header = "Copyright Example"

[[job]]
name = "pricing.facade"
contract = "app::IPricing"
pattern = "facade"
type_name = "Prices"
unmapped = "stub"
ambiguity = "note"
adapt_async = true
sources = ["app::PriceTable", "app::Legacy"]

[[job]]
name = "handler"
host = "app::Handler"
pattern = "pipeline"
ordering = "inner_first"
async = "force_on"

[[job]]
name = "quotes"
contract = "app::IQuotes"
pattern = "cached_factory"

[job.cache]
storage = "concurrent"
eviction = "lru"
capacity = 128
"#;
    let config = PatternsmithConfig::from_toml_str(text).map_err(|err| err.to_string())?;
    let facade = config.job("pricing.facade").ok_or("missing facade job")?.to_request();
    if facade.target != "app::IPricing"
        || facade.options.type_name.as_deref() != Some("Prices")
        || facade.options.unmapped != Some(UnmappedPolicy::Stub)
        || !facade.options.adapt_async
        || facade.options.sources != vec!["app::PriceTable".to_string(), "app::Legacy".to_string()]
    {
        return Err(format!("unexpected facade request: {facade:?}"));
    }
    let pipeline = config.job("handler").ok_or("missing pipeline job")?.to_request();
    if pipeline.target != "app::Handler"
        || pipeline.options.ordering != OrderingDirection::InnerFirst
        || pipeline.options.async_generation != AsyncGeneration::ForceOn
    {
        return Err(format!("unexpected pipeline request: {pipeline:?}"));
    }
    let cache = config.job("quotes").ok_or("missing cache job")?.to_options().cache;
    if cache.storage != CacheStorage::Concurrent
        || cache.eviction != EvictionPolicy::Lru
        || cache.capacity != Some(128)
    {
        return Err(format!("unexpected cache options: {cache:?}"));
    }
    Ok(())
}

// ============================================================================
// SECTION: Strictness
// ============================================================================

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let text = format!("{MINIMAL}retries = 3\n");
    assert_invalid(PatternsmithConfig::from_toml_str(&text), "config parse error")?;
    assert_invalid(
        PatternsmithConfig::from_toml_str("[output]\nfolder = \"x\"\n"),
        "config parse error",
    )
}

#[test]
fn unknown_pattern_is_a_parse_error() -> TestResult {
    let text = "[[job]]\nname = \"a\"\ncontract = \"C\"\npattern = \"singleton\"\n";
    assert_invalid(PatternsmithConfig::from_toml_str(text), "config parse error")
}

#[test]
fn config_without_jobs_is_invalid() -> TestResult {
    assert_invalid(PatternsmithConfig::from_toml_str(""), "at least one [[job]]")
}

#[test]
fn job_count_is_limited() -> TestResult {
    let mut text = String::new();
    for index in 0 ..= MAX_JOBS {
        text.push_str(&format!(
            "[[job]]\nname = \"job{index}\"\ncontract = \"C{index}\"\npattern = \"proxy\"\n"
        ));
    }
    assert_invalid(PatternsmithConfig::from_toml_str(&text), "too many jobs")
}

#[test]
fn duplicate_job_names_are_rejected() -> TestResult {
    let text = format!("{MINIMAL}{MINIMAL}");
    assert_invalid(PatternsmithConfig::from_toml_str(&text), "duplicate job name: logger")
}

#[test]
fn target_must_match_the_pattern_family() -> TestResult {
    let contract_on_pipeline = "[[job]]\nname = \"a\"\ncontract = \"C\"\npattern = \"pipeline\"\n";
    assert_invalid(PatternsmithConfig::from_toml_str(contract_on_pipeline), "must set host")?;
    let host_on_proxy = "[[job]]\nname = \"a\"\nhost = \"H\"\npattern = \"proxy\"\n";
    assert_invalid(PatternsmithConfig::from_toml_str(host_on_proxy), "must set contract")?;
    let both = "[[job]]\nname = \"a\"\ncontract = \"C\"\nhost = \"H\"\npattern = \"proxy\"\n";
    assert_invalid(PatternsmithConfig::from_toml_str(both), "only one of contract or host")?;
    let neither = "[[job]]\nname = \"a\"\npattern = \"facade\"\n";
    assert_invalid(PatternsmithConfig::from_toml_str(neither), "must set contract")
}

#[test]
fn oversized_header_is_rejected() -> TestResult {
    let text = format!("[output]\nheader = \"{}\"\n{MINIMAL}", "h".repeat(5000));
    assert_invalid(PatternsmithConfig::from_toml_str(&text), "output.header")
}

// ============================================================================
// SECTION: File Loading
// ============================================================================

#[test]
fn load_records_the_config_directory() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("patternsmith.toml");
    fs::write(&path, MINIMAL).map_err(|err| err.to_string())?;
    let config = PatternsmithConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.catalog_path() != dir.path().join("patternsmith-catalog.json") {
        return Err(format!("unexpected catalog path {}", config.catalog_path().display()));
    }
    Ok(())
}

#[test]
fn load_rejects_oversized_files() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("patternsmith.toml");
    let padding = format!("# {}\n", "x".repeat(MAX_CONFIG_FILE_SIZE));
    fs::write(&path, format!("{MINIMAL}{padding}")).map_err(|err| err.to_string())?;
    assert_invalid(PatternsmithConfig::load(Some(&path)), "size limit")
}

#[test]
fn load_rejects_non_utf8_files() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("patternsmith.toml");
    fs::write(&path, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    assert_invalid(PatternsmithConfig::load(Some(&path)), "utf-8")
}

#[test]
fn load_reports_missing_files_as_io_errors() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(PatternsmithConfig::load(Some(&path)), "config io error")
}
