// crates/patternsmith-config/src/config.rs
// ============================================================================
// Module: Patternsmith Configuration
// Description: Configuration loading and validation for synthesis runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: patternsmith-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys, oversized files, and malformed jobs fail closed before any
//! analysis runs. Semantic option conflicts (name clashes, cache knobs on the
//! wrong pattern) are left to the core, which reports them as diagnostics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use patternsmith_core::AmbiguityPolicy;
use patternsmith_core::AsyncGeneration;
use patternsmith_core::CacheOptions;
use patternsmith_core::OrderingDirection;
use patternsmith_core::PatternFamily;
use patternsmith_core::PatternKind;
use patternsmith_core::SynthesisOptions;
use patternsmith_core::SynthesisRequest;
use patternsmith_core::UnmappedPolicy;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "patternsmith.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PATTERNSMITH_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of jobs in one configuration.
pub const MAX_JOBS: usize = 256;
/// Maximum length of a job name.
pub const MAX_JOB_NAME_LENGTH: usize = 128;
/// Maximum size of the custom artifact header in bytes.
pub const MAX_HEADER_BYTES: usize = 4096;
/// Maximum number of facade source types per job.
pub const MAX_JOB_SOURCES: usize = 64;
/// Default catalog path.
const DEFAULT_CATALOG_PATH: &str = "patternsmith-catalog.json";
/// Default output directory.
const DEFAULT_OUTPUT_DIR: &str = "generated";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Patternsmith configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternsmithConfig {
    /// Type catalog location.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Artifact output settings.
    #[serde(default)]
    pub output: OutputConfig,
    /// Synthesis jobs in declaration order.
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobConfig>,
    /// Directory relative paths resolve against (not serialized).
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl PatternsmithConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: the explicit path, then [`CONFIG_ENV_VAR`], then
    /// [`DEFAULT_CONFIG_NAME`] in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.base_dir = resolved.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.catalog.validate()?;
        self.output.validate()?;
        if self.jobs.is_empty() {
            return Err(ConfigError::Invalid("at least one [[job]] must be declared".to_string()));
        }
        if self.jobs.len() > MAX_JOBS {
            return Err(ConfigError::Invalid(format!("too many jobs (max {MAX_JOBS})")));
        }
        let mut names = BTreeSet::new();
        for job in &self.jobs {
            job.validate()?;
            if !names.insert(job.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate job name: {}", job.name)));
            }
        }
        Ok(())
    }

    /// Returns the job with the given name.
    #[must_use]
    pub fn job(&self, name: &str) -> Option<&JobConfig> {
        self.jobs.iter().find(|job| job.name == name)
    }

    /// Returns the catalog path, resolved against the config directory.
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.resolve(&self.catalog.path)
    }

    /// Returns the output directory, resolved against the config directory.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output.dir)
    }

    /// Joins a configured relative path onto the config directory.
    fn resolve(&self, configured: &str) -> PathBuf {
        let path = Path::new(configured.trim());
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Type catalog location.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Path to the JSON catalog.
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

impl CatalogConfig {
    /// Validates the catalog path.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("catalog.path", &self.path)
    }
}

/// Artifact output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving generated artifacts and the run report.
    #[serde(default = "default_output_dir")]
    pub dir: String,
    /// Extra header lines placed under the generated marker.
    #[serde(default)]
    pub header: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            header: None,
        }
    }
}

impl OutputConfig {
    /// Validates the output directory and header.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("output.dir", &self.dir)?;
        if let Some(header) = &self.header
            && header.len() > MAX_HEADER_BYTES
        {
            return Err(ConfigError::Invalid(format!(
                "output.header exceeds {MAX_HEADER_BYTES} bytes"
            )));
        }
        Ok(())
    }
}

/// One synthesis job.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Unique job label.
    pub name: String,
    /// Contract type (forwarding and facade patterns).
    #[serde(default)]
    pub contract: Option<String>,
    /// Host type (composition patterns).
    #[serde(default)]
    pub host: Option<String>,
    /// Pattern to synthesize.
    pub pattern: PatternKind,
    /// Generated type name override.
    #[serde(default)]
    pub type_name: Option<String>,
    /// Composition wrap direction.
    #[serde(default)]
    pub ordering: OrderingDirection,
    /// Async-generation tri-state.
    #[serde(default, rename = "async")]
    pub async_generation: AsyncGeneration,
    /// Unmapped-member policy.
    #[serde(default)]
    pub unmapped: Option<UnmappedPolicy>,
    /// Ambiguity severity policy.
    #[serde(default)]
    pub ambiguity: AmbiguityPolicy,
    /// Allows sync/async adaptation when binding.
    #[serde(default)]
    pub adapt_async: bool,
    /// Facade source types in priority order.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Cached-factory knobs.
    #[serde(default)]
    pub cache: CacheOptions,
}

impl JobConfig {
    /// Returns the contract or host this job targets.
    ///
    /// Validation guarantees exactly one of the two is set.
    #[must_use]
    pub fn target(&self) -> &str {
        self.contract.as_deref().or(self.host.as_deref()).unwrap_or_default()
    }

    /// Converts the job into core synthesis options.
    #[must_use]
    pub fn to_options(&self) -> SynthesisOptions {
        let mut options = SynthesisOptions::new(self.pattern);
        options.type_name.clone_from(&self.type_name);
        options.ordering = self.ordering;
        options.async_generation = self.async_generation;
        options.unmapped = self.unmapped;
        options.ambiguity = self.ambiguity;
        options.adapt_async = self.adapt_async;
        options.sources.clone_from(&self.sources);
        options.cache = self.cache;
        options
    }

    /// Converts the job into a synthesis request.
    #[must_use]
    pub fn to_request(&self) -> SynthesisRequest {
        SynthesisRequest::new(self.name.clone(), self.target(), self.to_options())
    }

    /// Validates the job's shape.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the job is malformed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_job_name(&self.name)?;
        let composition = self.pattern.family() == PatternFamily::Composition;
        let label = format!("job `{}`", self.name);
        match (&self.contract, &self.host) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(format!(
                    "{label} must set only one of contract or host"
                )));
            }
            (None, None) => {
                let expected = if composition { "host" } else { "contract" };
                return Err(ConfigError::Invalid(format!("{label} must set {expected}")));
            }
            (Some(_), None) if composition => {
                return Err(ConfigError::Invalid(format!(
                    "{label} uses a composition pattern and must set host"
                )));
            }
            (None, Some(_)) if !composition => {
                return Err(ConfigError::Invalid(format!(
                    "{label} uses a contract pattern and must set contract"
                )));
            }
            _ => {}
        }
        if self.target().trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{label} target must be non-empty")));
        }
        if self.sources.len() > MAX_JOB_SOURCES {
            return Err(ConfigError::Invalid(format!(
                "{label} declares too many sources (max {MAX_JOB_SOURCES})"
            )));
        }
        if self.sources.iter().any(|source| source.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("{label} sources must be non-empty")));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default catalog path.
fn default_catalog_path() -> String {
    DEFAULT_CATALOG_PATH.to_string()
}

/// Default output directory.
fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a job label: ASCII letters, digits, `-`, `_`, `.`.
fn validate_job_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Invalid("job.name must be non-empty".to_string()));
    }
    if name.len() > MAX_JOB_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "job.name exceeds {MAX_JOB_NAME_LENGTH} characters"
        )));
    }
    if !name.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.')) {
        return Err(ConfigError::Invalid(format!("job.name `{name}` contains invalid characters")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
