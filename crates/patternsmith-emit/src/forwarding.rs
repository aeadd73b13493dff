// crates/patternsmith-emit/src/forwarding.rs
// ============================================================================
// Module: Forwarding Renderers
// Description: Decorator, proxy, and cached-factory source rendering.
// Purpose: Emit wrapper types that forward a contract surface to an inner value.
// Dependencies: patternsmith-core
// ============================================================================

//! ## Overview
//! Every forwarding artifact is a generic wrapper `Name<T>` over an inner
//! implementation of the contract trait. Members are emitted in surface order.
//!
//! - Decorator: non-ignored members call a `decorate` hook before forwarding.
//! - Proxy: non-ignored members run `before` and `after` interception hooks.
//! - Cached factory: synchronous by-value methods with a result are memoised
//!   per argument tuple; everything else forwards.
//!
//! Partial-base contracts only receive their forwardable members; ignored
//! overridable members keep the trait's default behaviour.

// ============================================================================
// SECTION: Imports
// ============================================================================

use patternsmith_core::AsyncShape;
use patternsmith_core::CacheStorage;
use patternsmith_core::ClassifiedMember;
use patternsmith_core::ContractVariant;
use patternsmith_core::ForwardingModel;
use patternsmith_core::MemberKind;
use patternsmith_core::PatternKind;
use patternsmith_core::RefMode;

use crate::writer::SourceWriter;
use crate::writer::argument_list;
use crate::writer::function_name;
use crate::writer::getter_signature;
use crate::writer::has_setter;
use crate::writer::identifier;
use crate::writer::method_signature;
use crate::writer::setter_name;
use crate::writer::setter_signature;
use crate::writer::short_name;
use crate::writer::snake_case;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Renders a forwarding model into the writer.
pub fn render(writer: &mut SourceWriter, model: &ForwardingModel) {
    let members: Vec<&ClassifiedMember> =
        model.members.iter().filter(|member| member.forwardable).collect();
    match model.pattern {
        PatternKind::Proxy => render_proxy(writer, model, &members),
        PatternKind::CachedFactory => render_cached(writer, model, &members),
        _ => render_decorator(writer, model, &members),
    }
}

/// Writes the wrapper struct, constructors, and accessors.
fn render_wrapper(
    writer: &mut SourceWriter,
    model: &ForwardingModel,
    summary: &str,
    extra: Option<(&str, &str, &str)>,
) {
    let name = &model.type_name;
    writer.doc(summary);
    if model.variant == ContractVariant::PartialBase {
        writer.doc("");
        writer.doc(format!(
            "Only overridable members of `{}` are forwarded; ignored members keep their default behaviour.",
            model.contract
        ));
    }
    let generics = extra.map_or_else(|| "<T>".to_string(), |(param, _, default)| format!("<T, {param} = {default}>"));
    writer.open(format!("pub struct {name}{generics}"));
    writer.doc("Wrapped implementation.");
    writer.line("inner: T,");
    if let Some((param, field, _)) = extra {
        writer.doc("Hook implementation.");
        writer.line(format!("{field}: {param},"));
    }
    writer.close();
    writer.blank();

    writer.open(format!("impl<T> {name}<T>"));
    writer.doc("Wraps an implementation.");
    writer.line("#[must_use]");
    writer.open("pub fn new(inner: T) -> Self");
    match extra {
        Some((_, field, default)) => {
            writer.open("Self");
            writer.line("inner,");
            writer.line(format!("{field}: {default},"));
            writer.close();
        }
        None => {
            writer.open("Self");
            writer.line("inner,");
            writer.close();
        }
    }
    writer.close();
    writer.close();
    writer.blank();

    let (impl_generics, self_ty) = match extra {
        Some((param, _, _)) => (format!("<T, {param}>"), format!("{name}<T, {param}>")),
        None => ("<T>".to_string(), format!("{name}<T>")),
    };
    writer.open(format!("impl{impl_generics} {self_ty}"));
    if let Some((param, field, _)) = extra {
        writer.doc("Wraps an implementation with an explicit hook.");
        writer.line("#[must_use]");
        writer.open(format!("pub const fn with_{field}(inner: T, {field}: {param}) -> Self"));
        writer.open("Self");
        writer.line("inner,");
        writer.line(format!("{field},"));
        writer.close();
        writer.close();
        writer.blank();
    }
    writer.doc("Returns the wrapped implementation.");
    writer.line("#[must_use]");
    writer.open("pub const fn inner(&self) -> &T");
    writer.line("&self.inner");
    writer.close();
    writer.blank();
    writer.doc("Unwraps the wrapped implementation.");
    writer.line("#[must_use]");
    writer.open("pub fn into_inner(self) -> T");
    writer.line("self.inner");
    writer.close();
    writer.close();
    writer.blank();
}

/// Writes one forwarded member; `around` wraps the forwarded expression.
fn render_member<F>(writer: &mut SourceWriter, member: &ClassifiedMember, mut around: F)
where
    F: FnMut(&mut SourceWriter, &ClassifiedMember, &str, bool),
{
    let descriptor = &member.descriptor;
    match descriptor.kind {
        MemberKind::Property => {
            writer.open(getter_signature(descriptor));
            let call = format!("self.inner.{}()", function_name(descriptor));
            around(writer, member, &call, !descriptor.returns.is_unit());
            writer.close();
            if has_setter(descriptor) {
                writer.blank();
                writer.open(setter_signature(descriptor));
                let call = format!("self.inner.{}(value)", setter_name(descriptor));
                around(writer, member, &call, false);
                writer.close();
            }
        }
        _ => {
            writer.open(method_signature(descriptor));
            let call = format!(
                "self.inner.{}({})",
                function_name(descriptor),
                argument_list(&descriptor.parameters)
            );
            around(writer, member, &call, !descriptor.returns.is_unit());
            writer.close();
        }
    }
}

/// Writes `impl Contract for Name<..>` with the given member bodies.
fn render_contract_impl<F>(
    writer: &mut SourceWriter,
    model: &ForwardingModel,
    members: &[&ClassifiedMember],
    header: &str,
    mut around: F,
) where
    F: FnMut(&mut SourceWriter, &ClassifiedMember, &str, bool),
{
    writer.open(header);
    for (index, member) in members.iter().enumerate() {
        if index > 0 {
            writer.blank();
        }
        render_member(writer, member, &mut around);
    }
    writer.close();
    if members.is_empty() {
        writer.line(format!("// `{}` exposes no forwardable members.", model.contract));
    }
}

// ============================================================================
// SECTION: Decorator
// ============================================================================

/// Renders a decorator with a per-call decoration hook.
fn render_decorator(writer: &mut SourceWriter, model: &ForwardingModel, members: &[&ClassifiedMember]) {
    let hook = format!("{}Decoration", hook_stem(model));
    writer.doc(format!("Hook invoked before each decorated call on [`{}`].", model.type_name));
    writer.open(format!("pub trait {hook}"));
    writer.doc("Runs before the named member is forwarded.");
    writer.open("fn decorate(&self, member: &'static str)");
    writer.line("let _ = member;");
    writer.close();
    writer.close();
    writer.blank();
    writer.line(format!("impl {hook} for () {{}}"));
    writer.blank();

    render_wrapper(
        writer,
        model,
        &format!("Decorator forwarding `{}` to an inner implementation.", model.contract),
        Some(("D", "decoration", "()")),
    );
    let header = format!(
        "impl<T: {contract}, D: {hook}> {contract} for {name}<T, D>",
        contract = model.contract,
        name = model.type_name
    );
    render_contract_impl(writer, model, members, &header, |writer, member, call, _| {
        if !member.ignored {
            writer.line(format!("self.decoration.decorate(\"{}\");", member.name()));
        }
        writer.line(call);
    });
}

// ============================================================================
// SECTION: Proxy
// ============================================================================

/// Renders a proxy with `before`/`after` interception hooks.
fn render_proxy(writer: &mut SourceWriter, model: &ForwardingModel, members: &[&ClassifiedMember]) {
    let hook = format!("{}Interceptor", hook_stem(model));
    writer.doc(format!("Interception hooks for [`{}`].", model.type_name));
    writer.open(format!("pub trait {hook}"));
    writer.doc("Runs before the named member is forwarded.");
    writer.open("fn before(&self, member: &'static str)");
    writer.line("let _ = member;");
    writer.close();
    writer.blank();
    writer.doc("Runs after the named member returned.");
    writer.open("fn after(&self, member: &'static str)");
    writer.line("let _ = member;");
    writer.close();
    writer.close();
    writer.blank();
    writer.line(format!("impl {hook} for () {{}}"));
    writer.blank();

    render_wrapper(
        writer,
        model,
        &format!("Proxy intercepting calls to `{}`.", model.contract),
        Some(("I", "interceptor", "()")),
    );
    let header = format!(
        "impl<T: {contract}, I: {hook}> {contract} for {name}<T, I>",
        contract = model.contract,
        name = model.type_name
    );
    render_contract_impl(writer, model, members, &header, |writer, member, call, has_result| {
        if member.ignored {
            writer.line(call);
            return;
        }
        let name = member.name();
        writer.line(format!("self.interceptor.before(\"{name}\");"));
        if member.async_shape != AsyncShape::Sync {
            writer.line("// The after hook observes the returned handle, not its completion.");
        }
        if has_result {
            writer.line(format!("let result = {call};"));
            writer.line(format!("self.interceptor.after(\"{name}\");"));
            writer.line("result");
        } else {
            writer.line(format!("{call};"));
            writer.line(format!("self.interceptor.after(\"{name}\");"));
        }
    });
}

// ============================================================================
// SECTION: Cached Factory
// ============================================================================

/// Returns true when a member's results are memoised.
fn is_memoised(member: &ClassifiedMember) -> bool {
    let descriptor = &member.descriptor;
    descriptor.kind == MemberKind::Method
        && member.async_shape == AsyncShape::Sync
        && !descriptor.returns.is_unit()
        && descriptor.parameters.iter().all(|parameter| parameter.mode == RefMode::Value)
}

/// Returns the cache field name for a memoised member.
fn cache_field(member: &ClassifiedMember) -> String {
    format!("{}_cache", function_name(&member.descriptor).trim_start_matches("r#"))
}

/// Renders a cached factory with per-member memo slots.
fn render_cached(writer: &mut SourceWriter, model: &ForwardingModel, members: &[&ClassifiedMember]) {
    let name = &model.type_name;
    let memoised: Vec<&ClassifiedMember> =
        members.iter().copied().filter(|member| is_memoised(member)).collect();
    let concurrent = model.cache.storage == CacheStorage::Concurrent;
    let cell = if concurrent { "::std::sync::Mutex" } else { "::std::cell::RefCell" };
    let access = if concurrent {
        "lock().unwrap_or_else(::std::sync::PoisonError::into_inner)"
    } else {
        "borrow_mut()"
    };
    let capacity = model
        .cache
        .capacity
        .map_or_else(|| "None".to_string(), |capacity| format!("Some({capacity})"));

    if !memoised.is_empty() {
        render_cache_slot(writer);
    }

    writer.doc(format!("Cached factory memoising results of `{}`.", model.contract));
    writer.doc("");
    writer.doc("Argument and result types of memoised members must be `Clone + Eq + Hash`.");
    writer.open(format!("pub struct {name}<T>"));
    writer.doc("Wrapped implementation.");
    writer.line("inner: T,");
    for member in &memoised {
        writer.doc(format!("Memoised results of `{}`.", member.name()));
        writer.line(format!(
            "{}: {cell}<CacheSlot<{}, {}>>,",
            cache_field(member),
            key_type(member),
            member.descriptor.returns
        ));
    }
    writer.close();
    writer.blank();

    writer.open(format!("impl<T> {name}<T>"));
    writer.doc("Wraps an implementation with empty caches.");
    writer.line("#[must_use]");
    writer.open("pub fn new(inner: T) -> Self");
    writer.open("Self");
    writer.line("inner,");
    for member in &memoised {
        writer.line(format!("{}: {cell}::new(CacheSlot::new({capacity})),", cache_field(member)));
    }
    writer.close();
    writer.close();
    writer.blank();
    writer.doc("Drops every memoised result.");
    writer.open("pub fn clear(&self)");
    for member in &memoised {
        writer.line(format!("self.{}.{access}.clear();", cache_field(member)));
    }
    writer.close();
    writer.blank();
    writer.doc("Returns the wrapped implementation.");
    writer.line("#[must_use]");
    writer.open("pub const fn inner(&self) -> &T");
    writer.line("&self.inner");
    writer.close();
    writer.close();
    writer.blank();

    let header = format!("impl<T: {contract}> {contract} for {name}<T>", contract = model.contract);
    render_contract_impl(writer, model, members, &header, |writer, member, call, _| {
        if !is_memoised(member) {
            writer.line(call);
            return;
        }
        let field = cache_field(member);
        writer.line(format!("let key = {};", key_expression(member)));
        writer.open(format!("if let Some(value) = self.{field}.{access}.get(&key)"));
        writer.line("return value;");
        writer.close();
        writer.line(format!("let value = {call};"));
        writer.line(format!("self.{field}.{access}.insert(key, value.clone());"));
        writer.line("value");
    });
}

/// Returns the tuple type used as a memo key.
fn key_type(member: &ClassifiedMember) -> String {
    let parts: Vec<String> =
        member.descriptor.parameters.iter().map(|parameter| parameter.ty.to_string()).collect();
    match parts.as_slice() {
        [] => "()".to_string(),
        [single] => format!("({single},)"),
        _ => format!("({})", parts.join(", ")),
    }
}

/// Returns the expression building a memo key from cloned arguments.
fn key_expression(member: &ClassifiedMember) -> String {
    let parts: Vec<String> = member
        .descriptor
        .parameters
        .iter()
        .map(|parameter| format!("{}.clone()", identifier(&snake_case(&parameter.name))))
        .collect();
    match parts.as_slice() {
        [] => "()".to_string(),
        [single] => format!("({single},)"),
        _ => format!("({})", parts.join(", ")),
    }
}

/// Writes the bounded memo slot shared by every cached member.
fn render_cache_slot(writer: &mut SourceWriter) {
    writer.doc("Memoised results for one member, optionally bounded with LRU eviction.");
    writer.open("struct CacheSlot<K, V>");
    writer.doc("Cached results by argument tuple.");
    writer.line("entries: ::std::collections::HashMap<K, V>,");
    writer.doc("Keys from least to most recently used.");
    writer.line("recency: ::std::collections::VecDeque<K>,");
    writer.doc("Maximum entry count; unbounded when absent.");
    writer.line("capacity: Option<usize>,");
    writer.close();
    writer.blank();
    writer.open("impl<K: Clone + Eq + ::std::hash::Hash, V: Clone> CacheSlot<K, V>");
    writer.open("fn new(capacity: Option<usize>) -> Self");
    writer.open("Self");
    writer.line("entries: ::std::collections::HashMap::new(),");
    writer.line("recency: ::std::collections::VecDeque::new(),");
    writer.line("capacity,");
    writer.close();
    writer.close();
    writer.blank();
    writer.open("fn get(&mut self, key: &K) -> Option<V>");
    writer.line("let value = self.entries.get(key).cloned()?;");
    writer.open("if self.capacity.is_some()");
    writer.line("self.recency.retain(|entry| entry != key);");
    writer.line("self.recency.push_back(key.clone());");
    writer.close();
    writer.line("Some(value)");
    writer.close();
    writer.blank();
    writer.open("fn insert(&mut self, key: K, value: V)");
    writer.open("if let Some(capacity) = self.capacity");
    writer.line("self.recency.retain(|entry| entry != &key);");
    writer.line("self.recency.push_back(key.clone());");
    writer.open("while self.recency.len() > capacity");
    writer.open("if let Some(evicted) = self.recency.pop_front()");
    writer.line("self.entries.remove(&evicted);");
    writer.close();
    writer.close();
    writer.close();
    writer.line("self.entries.insert(key, value);");
    writer.close();
    writer.blank();
    writer.open("fn clear(&mut self)");
    writer.line("self.entries.clear();");
    writer.line("self.recency.clear();");
    writer.close();
    writer.close();
    writer.blank();
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the hook trait stem derived from the generated type name.
fn hook_stem(model: &ForwardingModel) -> &str {
    let name = short_name(&model.type_name);
    let suffix = match model.pattern {
        PatternKind::Proxy => "Proxy",
        _ => "Decorator",
    };
    match name.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() => stem,
        _ => name,
    }
}
