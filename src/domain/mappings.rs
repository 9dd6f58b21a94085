use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// External column header -> internal field name, used by CSV import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    columns: HashMap<String, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, header: impl Into<String>, field: impl Into<String>) -> Self {
        self.columns.insert(header.into(), field.into());
        self
    }

    pub fn field_for(&self, header: &str) -> Option<&str> {
        self.columns.get(header).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn transaction() -> Self {
        Self::from_pairs(&[
            ("Date", "date"),
            ("Description", "description"),
            ("Amount", "amount"),
            ("Type", "type"),
            ("Category", "category"),
            ("VAT Included", "vat_included"),
        ])
    }

    pub fn contact() -> Self {
        Self::from_pairs(&[
            ("Name", "name"),
            ("Email", "email"),
            ("Phone", "phone"),
            ("Company", "company_name"),
            ("Type", "type"),
        ])
    }

    pub fn invoice() -> Self {
        Self::from_pairs(&[
            ("Invoice Number", "invoice_number"),
            ("Customer", "customer_name"),
            ("Amount", "total_amount"),
            ("Paid Amount", "paid_amount"),
            ("Issue Date", "issue_date"),
            ("Due Date", "due_date"),
            ("Status", "status"),
        ])
    }

    /// Built-in mapping by entity name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "transaction" => Some(Self::transaction()),
            "contact" => Some(Self::contact()),
            "invoice" => Some(Self::invoice()),
            _ => None,
        }
    }

    pub const PRESETS: [&'static str; 3] = ["transaction", "contact", "invoice"];

    fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            columns: pairs
                .iter()
                .map(|(header, field)| (header.to_string(), field.to_string()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for FieldMapping {
    fn from(columns: HashMap<String, String>) -> Self {
        Self { columns }
    }
}
