// crates/patternsmith-emit/src/lib.rs
// ============================================================================
// Module: Patternsmith Emit Library
// Description: Rust-source renderer for analyzed synthesis models.
// Purpose: Implement the core renderer seam for every pattern family.
// Dependencies: patternsmith-core, tracing
// ============================================================================

//! ## Overview
//! [`RustRenderer`] turns a [`SynthesisModel`] into one Rust source artifact.
//! Rendering is a pure function of the model: all ordering decisions were made
//! during analysis, so the same model always produces the same text.
//!
//! ### Design Notes
//! - Contract names are used verbatim as Rust paths; contract members become
//!   `snake_case` trait methods taking `&self` (setters take `&mut self`).
//! - Every artifact starts with an `@generated` marker so tools can detect and
//!   skip generated files.
//! - Overloaded contract members cannot be expressed as trait methods and are
//!   rejected with [`RenderError::Unsupported`].
//!
//! ## Index
//! - Public API: [`RustRenderer`], [`GENERATED_MARKER`]
//! - Rendering: forwarding, facade, composition (private modules)

// ============================================================================
// SECTION: Modules
// ============================================================================

mod composition;
mod facade;
mod forwarding;
pub mod writer;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use patternsmith_core::ArtifactRenderer;
use patternsmith_core::MemberDescriptor;
use patternsmith_core::PatternKind;
use patternsmith_core::RenderError;
use patternsmith_core::SourceArtifact;
use patternsmith_core::SynthesisModel;
use tracing::debug;

use crate::writer::SourceWriter;
use crate::writer::file_name;
use crate::writer::function_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Marker placed on the first line of every generated artifact.
pub const GENERATED_MARKER: &str = "@generated";

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Renders synthesis models as Rust source.
///
/// # Invariants
/// - One artifact per model, named `<snake_case(type_name)>.rs`.
/// - Output is a pure function of the model and the configured header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RustRenderer {
    /// Extra header lines placed after the generated marker.
    header: Option<String>,
}

impl RustRenderer {
    /// Creates a renderer with the default header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this renderer with extra header text (one comment line per line).
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Writes the generated-file banner.
    fn write_header(&self, writer: &mut SourceWriter, model: &SynthesisModel) {
        let (pattern, source) = match model {
            SynthesisModel::Forwarding(forwarding) => (forwarding.pattern, forwarding.contract.as_str()),
            SynthesisModel::Facade(facade) => (PatternKind::Facade, facade.contract.as_str()),
            SynthesisModel::Composition(composition) => {
                (composition.pattern, composition.plan.host.as_str())
            }
        };
        writer.line(format!("// This file is {GENERATED_MARKER} by patternsmith. DO NOT EDIT."));
        writer.line(format!("// Source: {source} ({})", pattern.as_str()));
        if let Some(header) = &self.header {
            for line in header.lines() {
                if line.is_empty() {
                    writer.line("//");
                } else {
                    writer.line(format!("// {line}"));
                }
            }
        }
        writer.blank();
    }
}

impl ArtifactRenderer for RustRenderer {
    fn render(&self, model: &SynthesisModel) -> Result<Vec<SourceArtifact>, RenderError> {
        let mut writer = SourceWriter::new();
        self.write_header(&mut writer, model);
        match model {
            SynthesisModel::Forwarding(forwarding) => {
                reject_overloads(forwarding.members.iter().map(|member| &member.descriptor))?;
                forwarding::render(&mut writer, forwarding);
            }
            SynthesisModel::Facade(facade) => {
                reject_overloads(facade.members.iter().map(|resolved| &resolved.member.descriptor))?;
                facade::render(&mut writer, facade)?;
            }
            SynthesisModel::Composition(composition) => {
                composition::render(&mut writer, composition);
            }
        }
        let name = file_name(model.type_name());
        let text = writer.finish();
        debug!(artifact = %name, bytes = text.len(), "artifact rendered");
        Ok(vec![SourceArtifact {
            name,
            text,
        }])
    }
}

/// Fails when two members would render to the same function name.
fn reject_overloads<'a>(members: impl Iterator<Item = &'a MemberDescriptor>) -> Result<(), RenderError> {
    let mut seen = BTreeSet::new();
    for member in members {
        if !seen.insert(function_name(member)) {
            return Err(RenderError::Unsupported(format!(
                "overloaded member `{}` cannot be expressed as a Rust trait method",
                member.name
            )));
        }
    }
    Ok(())
}
