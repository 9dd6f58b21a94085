use crate::domain::model::Record;
use serde_json::Value;

/// Per-row check run during import; `Some(message)` rejects the row.
pub trait RowValidator {
    fn validate(&self, record: &Record) -> Option<String>;
}

impl<F> RowValidator for F
where
    F: Fn(&Record) -> Option<String>,
{
    fn validate(&self, record: &Record) -> Option<String> {
        self(record)
    }
}

pub fn accept_all() -> impl RowValidator {
    |_: &Record| -> Option<String> { None }
}

/// Rejects rows where any of the fields is absent, null or blank.
#[derive(Debug, Clone)]
pub struct RequiredFields {
    fields: Vec<String>,
}

pub fn require_fields(fields: &[&str]) -> RequiredFields {
    RequiredFields {
        fields: fields.iter().map(|f| f.to_string()).collect(),
    }
}

impl RowValidator for RequiredFields {
    fn validate(&self, record: &Record) -> Option<String> {
        self.fields
            .iter()
            .find(|field| match record.get(field) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .map(|field| format!("Missing required field: {}", field))
    }
}
