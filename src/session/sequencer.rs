//! Fixed traversal order over form sections.
//!
//! After a successful submission the session asks the order which section
//! comes next. Sections outside the declared order simply terminate the
//! sequence rather than erroring.

use serde::{Deserialize, Serialize};

use crate::catalog::FormCatalog;
use crate::session::state_machine::SessionError;

/// Ordered list of section names defining the auto-advance sequence. May be
/// a subset of the catalog; every listed name must exist in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormOrder {
    names: Vec<String>,
}

impl FormOrder {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Default traversal: every catalog section, in catalog order.
    pub fn of_catalog(catalog: &FormCatalog) -> Self {
        Self {
            names: catalog.section_names().map(str::to_string).collect(),
        }
    }

    /// Every name in the order must resolve in the catalog.
    pub fn validate(&self, catalog: &FormCatalog) -> Result<(), SessionError> {
        for name in &self.names {
            if !catalog.contains(name) {
                return Err(SessionError::UnknownSection { name: name.clone() });
            }
        }
        Ok(())
    }

    /// The section following `current`'s first occurrence, or `None` when
    /// `current` is last or not listed at all.
    pub fn next_after(&self, current: &str) -> Option<&str> {
        let idx = self.names.iter().position(|n| n == current)?;
        self.names.get(idx + 1).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
