//! Field-level validation errors shared by every payload schema.

use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

/// A single field-level validation failure, keyed by the wire field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens `validator` errors into wire-named field errors.
///
/// Struct field names are converted to camelCase and nested paths are joined
/// with `.` (lists use `name[index]`). The output is sorted by field name so
/// responses are stable.
pub fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_into(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect_into(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let name = join_path(prefix, &snake_to_camel(&field.to_string()));
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for e in field_errors {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| default_message(&e.code));
                    out.push(FieldError::new(name.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_into(inner, &name, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_into(inner, &format!("{}[{}]", name, index), out);
                }
            }
        }
    }
}

fn default_message(code: &str) -> String {
    match code {
        "required" => "This field is required".to_string(),
        "length" => "This field has an invalid length".to_string(),
        "range" => "This value is out of range".to_string(),
        other => format!("Invalid value ({})", other),
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Converts `tanggal_lahir` style identifiers into `tanggalLahir`.
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
