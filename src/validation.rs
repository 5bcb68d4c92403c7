//! Required-field validation and completion progress.
//!
//! Deliberately shallow: a required field is satisfied by any value that is
//! non-empty after trimming, regardless of declared kind. No numeric, date,
//! or format checking happens here.

use std::collections::{BTreeMap, HashMap};

use crate::catalog::FieldDescriptor;

/// Per-field error messages, keyed by field name. A field appears here iff
/// it is required and its draft value is missing or blank after trimming.
pub type ValidationErrors = BTreeMap<String, String>;

fn is_filled(draft: &HashMap<String, String>, field_name: &str) -> bool {
    draft
        .get(field_name)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

/// Full validation pass over a section's fields against the current draft.
pub fn compute_errors(
    fields: &[FieldDescriptor],
    draft: &HashMap<String, String>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for field in fields {
        if field.required && !is_filled(draft, &field.name) {
            errors.insert(field.name.clone(), format!("{} is required", field.label));
        }
    }
    errors
}

/// Completion percentage over required fields, rounded to the nearest
/// integer. A section with no required fields reports 0, not 100 — there is
/// nothing to complete, and dividing by zero is not an option.
pub fn compute_progress(fields: &[FieldDescriptor], draft: &HashMap<String, String>) -> u8 {
    let required: Vec<&FieldDescriptor> = fields.iter().filter(|f| f.required).collect();
    if required.is_empty() {
        return 0;
    }
    let filled = required.iter().filter(|f| is_filled(draft, &f.name)).count();
    ((filled as f64 / required.len() as f64) * 100.0).round() as u8
}

/// A submission is accepted iff a full recompute produces no errors.
pub fn is_valid(errors: &ValidationErrors) -> bool {
    errors.is_empty()
}
