// crates/patternsmith-cli/src/lib.rs
// ============================================================================
// Module: Patternsmith CLI Library
// Description: Run workflow shared by the `patternsmith` binary and its tests.
// Purpose: Keep command behaviour testable without spawning processes.
// Dependencies: patternsmith-{core,config,emit}
// ============================================================================

//! ## Overview
//! The binary entry point (`src/main.rs`) parses arguments and prints; every
//! command's behaviour lives here so integration tests can drive it directly
//! against temporary directories.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod output;
pub mod workflow;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::CliError;
pub use workflow::CheckSummary;
pub use workflow::InputOverrides;
pub use workflow::REPORT_FILE_NAME;
pub use workflow::RenderFailure;
pub use workflow::RunInputs;
pub use workflow::RunSummary;
pub use workflow::analyze;
pub use workflow::check;
pub use workflow::generate;
pub use workflow::synthesize_all;
