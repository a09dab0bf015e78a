// src/core/resolver.rs

//! # Variable Resolver
//!
//! Pure functions over a variable mapping and string templates.
//!
//! Two placeholder styles exist, with deliberately different fallback rules:
//!
//! * `{{name}}` refers to a persisted configuration variable. An unresolved
//!   occurrence is left intact so missing configuration stays visible all the
//!   way to the terminal.
//! * `{name}` refers to an ephemeral per-invocation input (e.g. a commit
//!   message) keyed by the owning group+label. An unresolved occurrence
//!   substitutes the empty string: it is an argument, not configuration.
//!
//! Identifiers are restricted to word characters (`[A-Za-z0-9_]`); braces do
//! not nest. Anything that fails to parse as a placeholder is literal text.

use std::collections::BTreeMap;

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// One parsed segment of a `{{...}}` template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    /// A well-formed placeholder; `raw` is the original `{{name}}` text used
    /// when the variable cannot be resolved.
    Placeholder { name: &'a str, raw: &'a str },
}

/// First pass: split the template into literal runs and placeholders.
fn tokenize(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut lit_start = 0;
    let mut pos = 0;

    while let Some(found) = template[pos..].find("{{") {
        let start = pos + found;
        let ident_start = start + 2;
        let tail = &template[ident_start..];
        let ident_len = tail.bytes().take_while(|b| is_ident_byte(*b)).count();

        if ident_len > 0 && tail[ident_len..].starts_with("}}") {
            let end = ident_start + ident_len + 2;
            if lit_start < start {
                segments.push(Segment::Literal(&template[lit_start..start]));
            }
            segments.push(Segment::Placeholder {
                name: &tail[..ident_len],
                raw: &template[start..end],
            });
            pos = end;
            lit_start = end;
        } else {
            // Not a placeholder (empty or malformed identifier); the braces
            // are literal text.
            pos = start + 2;
        }
    }

    if lit_start < template.len() {
        segments.push(Segment::Literal(&template[lit_start..]));
    }
    segments
}

/// Replaces every `{{name}}` whose variable is present and non-empty with its
/// value. Unresolved placeholders keep their original form.
pub fn resolve_template(template: &str, vars: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    for segment in tokenize(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder { name, raw } => match vars.get(name) {
                Some(value) if !value.is_empty() => out.push_str(value),
                _ => out.push_str(raw),
            },
        }
    }
    out
}

/// The subset of a command's declared required variables whose value is
/// absent or empty. A command that declares nothing never blocks.
pub fn missing_required_vars(required: &[String], vars: &BTreeMap<String, String>) -> Vec<String> {
    required
        .iter()
        .filter(|name| vars.get(name.as_str()).is_none_or(|value| value.is_empty()))
        .cloned()
        .collect()
}

/// The stable identifier under which a command's inline inputs are keyed:
/// the owning group's category plus the command label.
pub fn input_key(category: &str, label: &str) -> String {
    format!("{category}-{label}")
}

/// Substitutes single-brace `{name}` inline-input slots from
/// `inputs["<key>-<name>"]`. Double-brace variable placeholders are passed
/// through untouched; a missing input becomes the empty string.
pub fn resolve_inline_inputs(
    template: &str,
    inputs: &BTreeMap<String, String>,
    key: &str,
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut pos = 0;

    while let Some(found) = template[pos..].find('{') {
        let start = pos + found;

        // `{{` belongs to the persisted-variable syntax; copy it through and
        // keep scanning after the pair.
        if template[start..].starts_with("{{") {
            out.push_str(&template[pos..start + 2]);
            pos = start + 2;
            continue;
        }

        let ident_start = start + 1;
        let tail = &template[ident_start..];
        let ident_len = tail.bytes().take_while(|b| is_ident_byte(*b)).count();

        if ident_len > 0 && tail[ident_len..].starts_with('}') {
            out.push_str(&template[pos..start]);
            let name = &tail[..ident_len];
            if let Some(value) = inputs.get(&format!("{key}-{name}")) {
                out.push_str(value);
            }
            pos = ident_start + ident_len + 1;
        } else {
            out.push_str(&template[pos..ident_start]);
            pos = ident_start;
        }
    }

    out.push_str(&template[pos..]);
    out
}

// MARK: --- UNIT TESTS ---
