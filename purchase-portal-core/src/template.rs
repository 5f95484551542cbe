//! Form template definitions
//!
//! The purchase agreement form is a fixed, ordered list of sections. Each
//! section carries its fields with labels, input types and required flags.
//! Both the renderer and the session layer read labels from here so the
//! email and the form never disagree on wording.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::TemplateError;

/// Input type of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line text input
    ShortText,
    /// Multi-line text area
    LongText,
    /// Date picker (YYYY-MM-DD)
    Date,
}

/// Definition of a single field in a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field identifier (key in the submitted form data)
    pub name: String,

    /// Human-readable label
    pub label: String,

    /// The input type
    pub field_type: FieldType,

    /// Is this field required?
    #[serde(default)]
    pub required: bool,

    /// Hint shown inside an empty input
    #[serde(default)]
    pub hint: Option<String>,
}

impl FieldDefinition {
    /// Label to display for this field.
    ///
    /// Falls back to the humanized field name when no explicit label is set.
    pub fn display_label(&self) -> String {
        if self.label.trim().is_empty() {
            humanize_field_name(&self.name)
        } else {
            self.label.clone()
        }
    }
}

/// A titled group of fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub fields: Vec<FieldDefinition>,
}

/// A complete form template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormTemplate {
    /// Unique template identifier
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Ordered sections
    pub sections: Vec<Section>,
}

impl FormTemplate {
    /// All fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    /// Get a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields().find(|f| f.name == name)
    }

    /// Get all required fields
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields().filter(|f| f.required)
    }

    /// Check that field names are unique across all sections
    pub fn validate(&self) -> Result<(), TemplateError> {
        let mut seen = HashSet::new();
        for field in self.fields() {
            if !seen.insert(field.name.as_str()) {
                return Err(TemplateError::DuplicateField(field.name.clone()));
            }
        }
        Ok(())
    }

    /// The built-in purchase agreement form
    pub fn purchase_agreement() -> Self {
        FormTemplate {
            id: "purchase-agreement".into(),
            name: "Purchase Agreement".into(),
            sections: vec![
                Section {
                    title: "Agreement Information".into(),
                    fields: vec![
                        field(
                            "agreementDate",
                            "Agreement Date",
                            FieldType::Date,
                            true,
                            "YYYY-MM-DD",
                        ),
                        field(
                            "closingDate",
                            "Closing Date",
                            FieldType::Date,
                            true,
                            "YYYY-MM-DD",
                        ),
                        field(
                            "governingLaw",
                            "Governing Law (State/Country)",
                            FieldType::ShortText,
                            true,
                            "e.g., California, United States",
                        ),
                    ],
                },
                Section {
                    title: "Party Information".into(),
                    fields: vec![
                        field(
                            "buyerName",
                            "Buyer Name",
                            FieldType::ShortText,
                            true,
                            "Full legal name or entity name",
                        ),
                        field(
                            "buyerAddress",
                            "Buyer Address",
                            FieldType::LongText,
                            true,
                            "Complete mailing address",
                        ),
                        field(
                            "sellerName",
                            "Seller Name",
                            FieldType::ShortText,
                            true,
                            "Full legal name or entity name",
                        ),
                        field(
                            "sellerAddress",
                            "Seller Address",
                            FieldType::LongText,
                            true,
                            "Complete mailing address",
                        ),
                    ],
                },
                Section {
                    title: "Transaction Details".into(),
                    fields: vec![
                        field(
                            "assetDescription",
                            "Description of Assets/Business Being Purchased",
                            FieldType::LongText,
                            true,
                            "Detailed description of assets, inventory, or business being transferred",
                        ),
                        field(
                            "purchasePrice",
                            "Purchase Price",
                            FieldType::ShortText,
                            true,
                            "e.g., $500,000.00 USD",
                        ),
                        field(
                            "paymentTerms",
                            "Payment Terms",
                            FieldType::LongText,
                            true,
                            "Payment schedule, method, and conditions",
                        ),
                    ],
                },
                Section {
                    title: "Legal Provisions".into(),
                    fields: vec![
                        field(
                            "warranties",
                            "Key Representations and Warranties",
                            FieldType::LongText,
                            true,
                            "Representations and warranties made by the parties",
                        ),
                        field(
                            "covenants",
                            "Covenants and Agreements",
                            FieldType::LongText,
                            false,
                            "Additional covenants and agreements (optional)",
                        ),
                        field(
                            "indemnification",
                            "Indemnification Provisions",
                            FieldType::LongText,
                            true,
                            "Indemnification terms and conditions",
                        ),
                        field(
                            "disputeResolution",
                            "Dispute Resolution",
                            FieldType::LongText,
                            false,
                            "Arbitration, mediation, or litigation procedures (optional)",
                        ),
                    ],
                },
                Section {
                    title: "Signatures".into(),
                    fields: vec![
                        field(
                            "buyerSignature",
                            "Buyer Authorized Signature",
                            FieldType::ShortText,
                            true,
                            "Full name as signature",
                        ),
                        field(
                            "buyerTitle",
                            "Buyer Signatory Title",
                            FieldType::ShortText,
                            false,
                            "e.g., CEO, President, Owner",
                        ),
                        field(
                            "sellerSignature",
                            "Seller Authorized Signature",
                            FieldType::ShortText,
                            true,
                            "Full name as signature",
                        ),
                        field(
                            "sellerTitle",
                            "Seller Signatory Title",
                            FieldType::ShortText,
                            false,
                            "e.g., CEO, President, Owner",
                        ),
                        field(
                            "signatureDate",
                            "Signature Date",
                            FieldType::Date,
                            true,
                            "YYYY-MM-DD",
                        ),
                    ],
                },
            ],
        }
    }
}

fn field(
    name: &str,
    label: &str,
    field_type: FieldType,
    required: bool,
    hint: &str,
) -> FieldDefinition {
    FieldDefinition {
        name: name.into(),
        label: label.into(),
        field_type,
        required,
        hint: Some(hint.into()),
    }
}

/// Turn a camelCase field name into a display label.
///
/// `buyerName` becomes `Buyer Name`.
pub fn humanize_field_name(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i == 0 {
            label.extend(ch.to_uppercase());
        } else {
            if ch.is_uppercase() {
                label.push(' ');
            }
            label.push(ch);
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_template_is_valid() {
        let template = FormTemplate::purchase_agreement();
        assert!(template.validate().is_ok());
        assert_eq!(template.sections.len(), 5);
        assert_eq!(template.fields().count(), 19);
    }

    #[test]
    fn test_required_fields() {
        let template = FormTemplate::purchase_agreement();
        let optional: Vec<_> = template
            .fields()
            .filter(|f| !f.required)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(
            optional,
            vec!["covenants", "disputeResolution", "buyerTitle", "sellerTitle"]
        );
        assert_eq!(template.required_fields().count(), 15);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut template = FormTemplate::purchase_agreement();
        let dup = template.sections[0].fields[0].clone();
        template.sections[4].fields.push(dup);
        match template.validate() {
            Err(TemplateError::DuplicateField(name)) => assert_eq!(name, "agreementDate"),
            other => panic!("expected duplicate field error, got {:?}", other),
        }
    }

    #[test]
    fn test_humanize_field_name() {
        assert_eq!(humanize_field_name("buyerName"), "Buyer Name");
        assert_eq!(humanize_field_name("disputeResolution"), "Dispute Resolution");
        assert_eq!(humanize_field_name("warranties"), "Warranties");
        assert_eq!(humanize_field_name(""), "");
    }

    #[test]
    fn test_display_label_prefers_explicit_label() {
        let template = FormTemplate::purchase_agreement();
        let field = template.field("assetDescription").unwrap();
        assert_eq!(
            field.display_label(),
            "Description of Assets/Business Being Purchased"
        );

        let unlabeled = FieldDefinition {
            label: String::new(),
            ..field.clone()
        };
        assert_eq!(unlabeled.display_label(), "Asset Description");
    }

    #[test]
    fn test_template_serializes_snake_case_types() {
        let template = FormTemplate::purchase_agreement();
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["sections"][0]["fields"][0]["field_type"], "date");
        assert_eq!(json["sections"][1]["fields"][1]["field_type"], "long_text");
    }
}
