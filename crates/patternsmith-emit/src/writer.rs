// crates/patternsmith-emit/src/writer.rs
// ============================================================================
// Module: Source Writer
// Description: Indented line writer and Rust naming/type helpers.
// Purpose: Keep every renderer's output layout and spelling consistent.
// Dependencies: patternsmith-core
// ============================================================================

//! ## Overview
//! [`SourceWriter`] accumulates lines at a tracked indent depth. The helpers
//! below map catalog names onto Rust conventions: members become `snake_case`
//! functions, parameters render with their passing mode, and qualified
//! contract names are used verbatim as Rust paths.

// ============================================================================
// SECTION: Imports
// ============================================================================

use patternsmith_core::MemberDescriptor;
use patternsmith_core::Parameter;
use patternsmith_core::RefMode;
use patternsmith_core::TypeRef;

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Indentation unit for generated source.
const INDENT: &str = "    ";

/// Line-oriented source accumulator.
#[derive(Debug, Default)]
pub struct SourceWriter {
    /// Text written so far.
    out: String,
    /// Current indent depth.
    depth: usize,
}

impl SourceWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one line at the current depth.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0 .. self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    /// Writes an empty line.
    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Writes `text {` and indents.
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(format!("{} {{", text.as_ref()));
        self.depth += 1;
    }

    /// Dedents and writes `}`.
    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    /// Writes a `///` doc comment line.
    pub fn doc(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.line("///");
        } else {
            self.line(format!("/// {text}"));
        }
    }

    /// Returns the accumulated text.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }
}

// ============================================================================
// SECTION: Naming
// ============================================================================

/// Rust keywords that cannot be used as bare identifiers.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "yield",
];

/// Converts a `PascalCase` or `camelCase` name into `snake_case`.
///
/// Acronym runs stay together: `HTTPServer` becomes `http_server`.
#[must_use]
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (index, ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() {
            let previous = index.checked_sub(1).and_then(|at| chars.get(at));
            let next = chars.get(index + 1);
            let boundary = previous.is_some_and(|prev| {
                prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next.is_some_and(char::is_ascii_lowercase))
            });
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(*ch);
        }
    }
    out
}

/// Escapes identifiers that collide with Rust keywords.
#[must_use]
pub fn identifier(name: &str) -> String {
    if KEYWORDS.contains(&name) { format!("r#{name}") } else { name.to_string() }
}

/// Returns the function name for a member.
#[must_use]
pub fn function_name(member: &MemberDescriptor) -> String {
    identifier(&snake_case(&member.name))
}

/// Returns the setter name for a property.
#[must_use]
pub fn setter_name(member: &MemberDescriptor) -> String {
    format!("set_{}", snake_case(&member.name))
}

/// Returns the field name used to hold a source or inner value.
#[must_use]
pub fn field_name(type_name: &str) -> String {
    identifier(&snake_case(short_name(type_name)))
}

/// Returns the last path segment of a qualified name.
#[must_use]
pub fn short_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Returns the artifact file name for a generated type.
#[must_use]
pub fn file_name(type_name: &str) -> String {
    format!("{}.rs", snake_case(short_name(type_name)))
}

// ============================================================================
// SECTION: Signatures
// ============================================================================

/// Renders a parameter type with its passing mode.
#[must_use]
pub fn parameter_type(parameter: &Parameter) -> String {
    match parameter.mode {
        RefMode::Value => parameter.ty.to_string(),
        RefMode::In => format!("&{}", parameter.ty),
        RefMode::Ref | RefMode::Out => format!("&mut {}", parameter.ty),
    }
}

/// Renders `name: Type` pairs for a parameter list.
#[must_use]
pub fn parameter_list(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|parameter| format!("{}: {}", identifier(&snake_case(&parameter.name)), parameter_type(parameter)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the argument names for a forwarded call.
#[must_use]
pub fn argument_list(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|parameter| identifier(&snake_case(&parameter.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders ` -> T`, or nothing for unit.
#[must_use]
pub fn return_clause(returns: &TypeRef) -> String {
    if returns.is_unit() { String::new() } else { format!(" -> {returns}") }
}

/// Renders the method signature `fn name(&self, ..) -> T`.
#[must_use]
pub fn method_signature(member: &MemberDescriptor) -> String {
    let parameters = parameter_list(&member.parameters);
    let receiver = if parameters.is_empty() { "&self".to_string() } else { format!("&self, {parameters}") };
    format!("fn {}({receiver}){}", function_name(member), return_clause(&member.returns))
}

/// Renders the property getter signature.
#[must_use]
pub fn getter_signature(member: &MemberDescriptor) -> String {
    format!("fn {}(&self){}", function_name(member), return_clause(&member.returns))
}

/// Renders the property setter signature.
#[must_use]
pub fn setter_signature(member: &MemberDescriptor) -> String {
    format!("fn {}(&mut self, value: {})", setter_name(member), member.returns)
}

/// Returns true when a property exposes a setter.
#[must_use]
pub fn has_setter(member: &MemberDescriptor) -> bool {
    member.accessors.is_some_and(|accessors| accessors.set.is_some())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
