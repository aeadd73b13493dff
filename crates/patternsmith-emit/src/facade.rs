// crates/patternsmith-emit/src/facade.rs
// ============================================================================
// Module: Facade Renderer
// Description: Facade source rendering over bound source implementations.
// Purpose: Emit a type holding each source and delegating bound members.
// Dependencies: patternsmith-core
// ============================================================================

//! ## Overview
//! The facade owns one field per configured source, in configuration order,
//! and implements the contract trait by delegating each bound member to its
//! chosen candidate. Stubbed members raise `unimplemented!`; ignored members
//! return `Default::default()` (wrapped in a ready handle when async).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use patternsmith_core::AsyncAdaptation;
use patternsmith_core::Binding;
use patternsmith_core::FacadeModel;
use patternsmith_core::MemberDescriptor;
use patternsmith_core::MemberKind;
use patternsmith_core::RenderError;
use patternsmith_core::Resolution;
use patternsmith_core::ResolvedMember;
use patternsmith_core::TypeRef;

use crate::writer::SourceWriter;
use crate::writer::argument_list;
use crate::writer::field_name;
use crate::writer::function_name;
use crate::writer::getter_signature;
use crate::writer::method_signature;
use crate::writer::setter_name;
use crate::writer::setter_signature;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Renders a facade model into the writer.
///
/// # Errors
///
/// Returns [`RenderError::Unsupported`] when a member is still unmapped.
pub fn render(writer: &mut SourceWriter, model: &FacadeModel) -> Result<(), RenderError> {
    let fields = source_fields(&model.sources);
    let name = &model.type_name;

    writer.doc(format!("Facade implementing `{}` over its configured sources.", model.contract));
    writer.open(format!("pub struct {name}"));
    for (source, field) in model.sources.iter().zip(&fields) {
        writer.doc(format!("`{source}` source."));
        writer.line(format!("{field}: {source},"));
    }
    writer.close();
    writer.blank();

    writer.open(format!("impl {name}"));
    writer.doc("Creates the facade from its sources.");
    writer.line("#[must_use]");
    let parameters = model
        .sources
        .iter()
        .zip(&fields)
        .map(|(source, field)| format!("{field}: {source}"))
        .collect::<Vec<_>>()
        .join(", ");
    writer.open(format!("pub const fn new({parameters}) -> Self"));
    writer.open("Self");
    for field in &fields {
        writer.line(format!("{field},"));
    }
    writer.close();
    writer.close();
    writer.close();
    writer.blank();

    writer.open(format!("impl {} for {name}", model.contract));
    for (index, resolved) in model.members.iter().enumerate() {
        if index > 0 {
            writer.blank();
        }
        render_member(writer, model, &fields, resolved)?;
    }
    writer.close();
    Ok(())
}

/// Returns one distinct field name per source.
fn source_fields(sources: &[String]) -> Vec<String> {
    let mut taken = BTreeSet::new();
    sources
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let base = field_name(source);
            let field = if taken.contains(&base) { format!("{base}_{index}") } else { base };
            taken.insert(field.clone());
            field
        })
        .collect()
}

// ============================================================================
// SECTION: Members
// ============================================================================

/// Renders one contract member according to its resolution.
fn render_member(
    writer: &mut SourceWriter,
    model: &FacadeModel,
    fields: &[String],
    resolved: &ResolvedMember,
) -> Result<(), RenderError> {
    let descriptor = &resolved.member.descriptor;
    let is_property = descriptor.kind == MemberKind::Property;
    let signature =
        if is_property { getter_signature(descriptor) } else { method_signature(descriptor) };
    writer.open(signature);
    match &resolved.resolution {
        Resolution::Bound {
            binding,
        } => {
            let field = fields.get(binding.candidate.source_index).ok_or_else(|| {
                RenderError::Unsupported(format!("unknown source for `{}`", descriptor.name))
            })?;
            writer.line(bound_call(field, descriptor, binding));
        }
        Resolution::Stub => render_stub(writer, model, descriptor),
        Resolution::Default => render_default(writer, descriptor),
        Resolution::Unmapped => {
            return Err(RenderError::Unsupported(format!(
                "`{}` on `{}` is unmapped",
                descriptor.name, model.contract
            )));
        }
    }
    writer.close();

    if let Some(setter) = &resolved.setter {
        writer.blank();
        writer.open(setter_signature(descriptor));
        match setter {
            Resolution::Bound {
                binding,
            } => {
                let field = fields.get(binding.candidate.source_index).ok_or_else(|| {
                    RenderError::Unsupported(format!("unknown source for `{}`", descriptor.name))
                })?;
                writer.line(format!(
                    "self.{field}.{}(value);",
                    setter_name(&binding.candidate.member)
                ));
            }
            Resolution::Default => writer.line("let _ = value;"),
            Resolution::Stub => {
                writer.line("let _ = value;");
                writer.line(format!(
                    "unimplemented!(\"the setter of `{}` has no implementation among the facade sources\")",
                    descriptor.name
                ));
            }
            Resolution::Unmapped => {
                return Err(RenderError::Unsupported(format!(
                    "the setter of `{}` on `{}` is unmapped",
                    descriptor.name, model.contract
                )));
            }
        }
        writer.close();
    }
    Ok(())
}

/// Returns the delegating call for a bound member, adapted to its shape.
fn bound_call(field: &str, descriptor: &MemberDescriptor, binding: &Binding) -> String {
    let candidate = &binding.candidate.member;
    let call = if candidate.kind == MemberKind::Property {
        format!("self.{field}.{}()", function_name(candidate))
    } else {
        format!(
            "self.{field}.{}({})",
            function_name(candidate),
            argument_list(&descriptor.parameters)
        )
    };
    match binding.adaptation {
        AsyncAdaptation::Direct => call,
        AsyncAdaptation::WrapCompleted => ready_handle(&descriptor.returns, &call),
        AsyncAdaptation::BlockOn => format!("::futures::executor::block_on({call})"),
    }
}

/// Wraps a value expression in an already-completed handle of the given type.
fn ready_handle(handle: &TypeRef, value: &str) -> String {
    match handle.base_name() {
        "BoxFuture" | "LocalBoxFuture" => format!("Box::pin(::std::future::ready({value}))"),
        _ => format!("::std::future::ready({value})"),
    }
}

/// Writes a body that discards the arguments.
fn discard_arguments(writer: &mut SourceWriter, descriptor: &MemberDescriptor) {
    match descriptor.parameters.len() {
        0 => {}
        1 => writer.line(format!("let _ = {};", argument_list(&descriptor.parameters))),
        _ => writer.line(format!("let _ = ({});", argument_list(&descriptor.parameters))),
    }
}

/// Writes a "not implemented" body.
fn render_stub(writer: &mut SourceWriter, model: &FacadeModel, descriptor: &MemberDescriptor) {
    discard_arguments(writer, descriptor);
    writer.line(format!(
        "unimplemented!(\"`{}` of `{}` has no implementation among the facade sources\")",
        descriptor.name, model.contract
    ));
}

/// Writes a default-value body.
fn render_default(writer: &mut SourceWriter, descriptor: &MemberDescriptor) {
    discard_arguments(writer, descriptor);
    let returns = &descriptor.returns;
    if returns.is_completion_handle() {
        let value = if returns.unwrap_completion().is_unit() { "()" } else { "Default::default()" };
        writer.line(ready_handle(returns, value));
    } else if !returns.is_unit() {
        writer.line("Default::default()");
    }
}
