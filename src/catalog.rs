use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Input widget class for a field. The engine itself never branches on this
/// beyond knowing that `Select` fields carry an options list; it exists so
/// presentation adapters can pick a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Password,
    Date,
    Select,
}

/// One input within a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique within the owning section; the draft map key.
    pub name: String,
    pub kind: FieldKind,
    pub label: String,
    pub required: bool,
    #[serde(default)]
    pub placeholder: String,
    /// Populated iff `kind` is `Select`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// One named step of the multi-step form. Field order is preserved for
/// rendering and validation iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl SectionDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// Immutable registry of section definitions, supplied at startup.
/// Lookup is linear; catalogs are a handful of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormCatalog {
    sections: Vec<SectionDefinition>,
}

impl FormCatalog {
    pub fn new(sections: Vec<SectionDefinition>) -> Self {
        Self { sections }
    }

    /// Load a catalog from a local JSON file (static configuration, read
    /// once at startup).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading catalog file {}", path.as_ref().display()))?;
        let catalog: FormCatalog =
            serde_json::from_str(&raw).context("parsing catalog JSON")?;
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&SectionDefinition> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Section names in catalog order, for populating a selector.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionDefinition> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The built-in three-step catalog the engine ships with.
    pub fn builtin() -> Self {
        fn field(
            name: &str,
            kind: FieldKind,
            label: &str,
            required: bool,
            placeholder: &str,
        ) -> FieldDescriptor {
            FieldDescriptor {
                name: name.to_string(),
                kind,
                label: label.to_string(),
                required,
                placeholder: placeholder.to_string(),
                options: Vec::new(),
            }
        }

        Self::new(vec![
            SectionDefinition {
                name: "User Information".to_string(),
                fields: vec![
                    field("firstName", FieldKind::Text, "First Name", true, "eg. Jane"),
                    field("lastName", FieldKind::Text, "Last Name", true, "eg. Doe"),
                    field("age", FieldKind::Number, "Age", false, "eg. 21"),
                ],
            },
            SectionDefinition {
                name: "Address Information".to_string(),
                fields: vec![
                    field(
                        "street",
                        FieldKind::Text,
                        "Street Address",
                        true,
                        "eg. 123 Main Street",
                    ),
                    field("city", FieldKind::Text, "City", true, "eg. Kolkata"),
                    FieldDescriptor {
                        name: "state".to_string(),
                        kind: FieldKind::Select,
                        label: "State".to_string(),
                        required: true,
                        placeholder: "eg. West Bengal".to_string(),
                        options: vec![
                            "West Bengal".to_string(),
                            "Mumbai".to_string(),
                            "Delhi".to_string(),
                            "Pune".to_string(),
                        ],
                    },
                    field("zipCode", FieldKind::Text, "Zip Code", false, "eg. 94105"),
                ],
            },
            SectionDefinition {
                name: "Payment Information".to_string(),
                fields: vec![
                    field(
                        "cardNumber",
                        FieldKind::Text,
                        "Card Number",
                        true,
                        "eg. **** **** **** 1111",
                    ),
                    field("expiryDate", FieldKind::Date, "Expiry Date", true, "MM/YY"),
                    field("cvv", FieldKind::Password, "CVV", true, "eg. 123"),
                    field(
                        "cardholderName",
                        FieldKind::Text,
                        "Cardholder Name",
                        true,
                        "eg. Jane Doe",
                    ),
                ],
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_sections_in_order() {
        let catalog = FormCatalog::builtin();
        let names: Vec<&str> = catalog.section_names().collect();
        assert_eq!(
            names,
            vec![
                "User Information",
                "Address Information",
                "Payment Information"
            ]
        );
    }

    #[test]
    fn lookup_by_name() {
        let catalog = FormCatalog::builtin();
        let section = catalog.get("User Information").unwrap();
        assert_eq!(section.fields.len(), 3);
        assert!(section.has_field("firstName"));
        assert!(!section.has_field("street"));
        assert!(catalog.get("Unknown Section").is_none());
    }

    #[test]
    fn only_select_fields_carry_options() {
        let catalog = FormCatalog::builtin();
        for section in catalog.sections() {
            for field in &section.fields {
                if field.kind == FieldKind::Select {
                    assert!(!field.options.is_empty(), "{} missing options", field.name);
                } else {
                    assert!(field.options.is_empty(), "{} has stray options", field.name);
                }
            }
        }
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = FormCatalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let parsed: FormCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, catalog);
    }
}
