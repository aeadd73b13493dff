// crates/patternsmith-core/tests/classifier.rs
// ============================================================================
// Module: Member Classifier Tests
// Description: Eligibility, ordering, and all-or-nothing classification tests.
// ============================================================================
//! ## Overview
//! Integration tests for each classification rule and the ordinal ordering of
//! the resulting surface.

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

use patternsmith_core::Accessibility;
use patternsmith_core::AsyncShape;
use patternsmith_core::ClassifiedMember;
use patternsmith_core::ContractSurface;
use patternsmith_core::DiagnosticKind;
use patternsmith_core::DiagnosticSink;
use patternsmith_core::MemberClassifier;
use patternsmith_core::MemberDescriptor;
use patternsmith_core::MemberKind;
use patternsmith_core::PropertyAccessors;
use patternsmith_core::Severity;
use patternsmith_core::SpecialKind;
use patternsmith_core::SurfaceWalker;
use patternsmith_core::TypeDecl;
use patternsmith_core::TypeKind;
use support::TestResult;
use support::catalog;
use support::ensure;
use support::kinds;
use support::method;
use support::ty;
use support::virtual_method;

// ========================================================================
// Test Helpers
// ========================================================================

/// Walks and classifies a single-declaration contract.
fn classify(decl: TypeDecl) -> TestResult<(Vec<ClassifiedMember>, DiagnosticSink)> {
    let name = decl.name.clone();
    let catalog = catalog(vec![decl])?;
    let mut sink = DiagnosticSink::new();
    let contract = ContractSurface::capture(&catalog, &name, &mut sink).ok_or("capture")?;
    let raw = SurfaceWalker::new(&catalog).walk(&contract, &mut sink);
    let members = MemberClassifier.classify(&contract, raw, &mut sink);
    Ok((members, sink))
}

/// Returns member names in surface order.
fn names(members: &[ClassifiedMember]) -> Vec<&str> {
    members.iter().map(ClassifiedMember::name).collect()
}

// ============================================================================
// SECTION: Ordering
// ============================================================================

#[test]
fn surface_is_sorted_by_signature_key() -> TestResult {
    let decl = TypeDecl::new("ICalc", TypeKind::Interface)
        .with_member(method("B", &[("x", "int")], "int"))
        .with_member(method("A", &[], "int"));
    let (members, sink) = classify(decl)?;
    ensure(names(&members) == vec!["A", "B"], "A sorts before B ordinally")?;
    ensure(members.iter().all(|member| member.forwardable), "both are forwardable")?;
    ensure(sink.diagnostics().is_empty(), "no diagnostics expected")?;
    Ok(())
}

#[test]
fn overloads_order_by_parameter_shape() -> TestResult {
    let decl = TypeDecl::new("IWriter", TypeKind::Interface)
        .with_member(method("Write", &[("value", "String")], "()"))
        .with_member(method("Write", &[("value", "Bytes")], "()"))
        .with_member(method("Write", &[], "()"));
    let (members, _) = classify(decl)?;
    let keys: Vec<&str> = members.iter().map(|member| member.key.as_str()).collect();
    ensure(
        keys == vec!["M:Write()", "M:Write(Bytes)", "M:Write(String)"],
        format!("unexpected overload order {keys:?}"),
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Silent Skips
// ============================================================================

#[test]
fn static_special_and_field_members_are_skipped_silently() -> TestResult {
    let mut shared = method("Create", &[], "ICalc");
    shared.is_static = true;
    let mut operator = method("op_Add", &[("other", "ICalc")], "ICalc");
    operator.special = SpecialKind::Operator;
    let field = MemberDescriptor::of_kind(MemberKind::Field, "count", ty("int"));
    let decl = TypeDecl::new("ICalc", TypeKind::Interface)
        .with_member(shared)
        .with_member(operator)
        .with_member(field)
        .with_member(method("Run", &[], "int"));
    let (members, sink) = classify(decl)?;
    ensure(names(&members) == vec!["Run"], "only the instance method remains")?;
    ensure(sink.diagnostics().is_empty(), "skips are silent")?;
    Ok(())
}

#[test]
fn partial_base_skips_non_overridable_members() -> TestResult {
    let mut open = virtual_method("Open", "int");
    open.is_abstract = true;
    let decl = TypeDecl::new("ChannelBase", TypeKind::Class)
        .with_member(method("Helper", &[], "int"))
        .with_member(open)
        .with_member(virtual_method("Close", "()"));
    let (members, sink) = classify(decl)?;
    ensure(names(&members) == vec!["Close", "Open"], "non-virtual Helper is skipped")?;
    let open = members.iter().find(|member| member.name() == "Open").ok_or("open")?;
    let close = members.iter().find(|member| member.name() == "Close").ok_or("close")?;
    ensure(open.requires_implementation, "abstract members require implementation")?;
    ensure(!close.requires_implementation, "virtual members are inherited")?;
    ensure(sink.diagnostics().is_empty(), "no diagnostics expected")?;
    Ok(())
}

// ============================================================================
// SECTION: Errors and Warnings
// ============================================================================

#[test]
fn unsupported_member_kinds_discard_the_whole_surface() -> TestResult {
    let mut generic = method("Map", &[("value", "T")], "T");
    generic.type_params = vec!["T".to_string()];
    let mut indexer = MemberDescriptor::property("Item", ty("int"), false);
    indexer.parameters.push(patternsmith_core::Parameter::new("index", ty("int")));
    let event = MemberDescriptor::of_kind(MemberKind::Event, "Changed", ty("Handler"));
    let nested = MemberDescriptor::of_kind(MemberKind::NestedType, "Inner", ty("Inner"));
    let decl = TypeDecl::new("IWide", TypeKind::Interface)
        .with_member(method("Fine", &[], "int"))
        .with_member(generic)
        .with_member(indexer)
        .with_member(event)
        .with_member(nested);
    let (members, sink) = classify(decl)?;
    ensure(members.is_empty(), "any error empties the surface")?;
    ensure(
        kinds(sink.diagnostics())
            == vec![
                DiagnosticKind::GenericMember,
                DiagnosticKind::IndexerMember,
                DiagnosticKind::EventMember,
                DiagnosticKind::NestedTypeMember,
            ],
        format!("unexpected diagnostics {:?}", kinds(sink.diagnostics())),
    )?;
    Ok(())
}

#[test]
fn inaccessible_members_are_dropped_with_warnings() -> TestResult {
    let mut hidden = method("Hidden", &[], "int");
    hidden.accessibility = Accessibility::Protected;
    let mut shared = method("Shared", &[], "int");
    shared.accessibility = Accessibility::ProtectedInternal;
    let decl = TypeDecl::new("IMixed", TypeKind::Interface)
        .with_member(hidden)
        .with_member(shared)
        .with_member(method("Visible", &[], "int"));
    let (members, sink) = classify(decl)?;
    ensure(names(&members) == vec!["Shared", "Visible"], "protected member dropped")?;
    ensure(
        sink.diagnostics().iter().all(|diagnostic| diagnostic.severity == Severity::Warning),
        "inaccessibility is a warning",
    )?;
    ensure(
        kinds(sink.diagnostics()) == vec![DiagnosticKind::InaccessibleMember],
        "one warning expected",
    )?;
    Ok(())
}

#[test]
fn property_with_protected_setter_is_excluded() -> TestResult {
    let mut name = MemberDescriptor::property("Name", ty("String"), true);
    name.accessors = Some(PropertyAccessors {
        get: Some(Accessibility::Public),
        set: Some(Accessibility::Protected),
    });
    let decl = TypeDecl::new("INamed", TypeKind::Interface)
        .with_member(name)
        .with_member(MemberDescriptor::property("Id", ty("int"), false));
    let (members, sink) = classify(decl)?;
    ensure(names(&members) == vec!["Id"], "property with protected setter excluded")?;
    let diagnostic = sink.diagnostics().first().ok_or("missing warning")?;
    ensure(diagnostic.kind == DiagnosticKind::InaccessibleAccessor, "accessor warning")?;
    ensure(
        diagnostic.message() == "the set accessor of property `Name` is protected; the property is excluded",
        diagnostic.message(),
    )?;
    Ok(())
}

#[test]
fn empty_surface_is_reported_as_info() -> TestResult {
    let (members, sink) = classify(TypeDecl::new("IEmpty", TypeKind::Interface))?;
    ensure(members.is_empty(), "nothing to forward")?;
    ensure(
        kinds(sink.diagnostics()) == vec![DiagnosticKind::EmptySurface],
        "empty surface is advisory",
    )?;
    ensure(!sink.has_errors(), "empty surface is not an error")?;
    Ok(())
}

// ============================================================================
// SECTION: Tags
// ============================================================================

#[test]
fn async_classification_follows_completion_handles() -> TestResult {
    let decl = TypeDecl::new("IJobs", TypeKind::Interface)
        .with_member(method("Fetch", &[], "Future<int>"))
        .with_member(method("Flush", &[], "Future"))
        .with_member(method("Drain", &[], "futures::future::BoxFuture<()>"))
        .with_member(method("Count", &[], "int"));
    let (members, _) = classify(decl)?;
    let shapes: Vec<(&str, AsyncShape)> =
        members.iter().map(|member| (member.name(), member.async_shape)).collect();
    ensure(
        shapes
            == vec![
                ("Count", AsyncShape::Sync),
                ("Drain", AsyncShape::AsyncNoResult),
                ("Fetch", AsyncShape::AsyncWithResult),
                ("Flush", AsyncShape::AsyncNoResult),
            ],
        format!("unexpected shapes {shapes:?}"),
    )?;
    Ok(())
}

#[test]
fn ignore_marker_is_carried_through() -> TestResult {
    let mut quiet = method("Quiet", &[], "()");
    quiet.markers.ignore = true;
    let (members, _) = classify(TypeDecl::new("ILoud", TypeKind::Interface).with_member(quiet))?;
    let member = members.first().ok_or("missing member")?;
    ensure(member.ignored, "ignored flag set")?;
    ensure(member.forwardable, "capability-set members are always forwarded")?;
    Ok(())
}
