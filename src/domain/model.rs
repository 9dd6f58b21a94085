use crate::domain::language::Language;
use crate::utils::error::{BizError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// One exportable/importable entity. Key order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(field.into(), value.into());
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

/// Outcome of an import over a whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportResult {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    /// Accepted records, in input order.
    #[serde(skip)]
    pub records: Vec<Record>,
}

impl ImportResult {
    /// 整批失敗：沒有任何資料被處理
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: 0,
            failed: 0,
            errors: vec![message.into()],
            records: Vec::new(),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.success == 0 && self.failed == 0 && !self.errors.is_empty()
    }

    pub(crate) fn accept(&mut self, record: Record) {
        self.records.push(record);
        self.success += 1;
    }

    pub(crate) fn reject(&mut self, message: String) {
        self.errors.push(message);
        self.failed += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported { filename: String, records: usize },
    NothingToExport,
}

/// Nested translation tree of one language.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    language: Language,
    root: Map<String, Value>,
}

impl Bundle {
    pub fn from_value(language: Language, value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { language, root }),
            other => Err(BizError::BundleError {
                language: language.code().to_string(),
                message: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Walks a dotted key; only a string leaf counts as resolved.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut node = self.root.get(first)?;
        for segment in segments {
            node = node.as_object()?.get(segment)?;
        }
        node.as_str()
    }

    /// Dotted paths of every string leaf.
    pub fn keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        collect_keys(&self.root, "", &mut keys);
        keys
    }
}

fn collect_keys(node: &Map<String, Value>, prefix: &str, keys: &mut BTreeSet<String>) {
    for (segment, value) in node {
        let path = if prefix.is_empty() {
            segment.clone()
        } else {
            format!("{}.{}", prefix, segment)
        };
        match value {
            Value::String(_) => {
                keys.insert(path);
            }
            Value::Object(child) => collect_keys(child, &path, keys),
            _ => {}
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle() -> Bundle {
        Bundle::from_value(
            Language::En,
            json!({
                "common": {"save": "Save", "cancel": "Cancel"},
                "dashboard": {"kpi": {"revenue": "Revenue"}, "count": 3},
                "title": "Business Suite"
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_nested_string() {
        let bundle = bundle();
        assert_eq!(bundle.lookup("common.save"), Some("Save"));
        assert_eq!(bundle.lookup("dashboard.kpi.revenue"), Some("Revenue"));
        assert_eq!(bundle.lookup("title"), Some("Business Suite"));
    }

    #[test]
    fn test_lookup_incomplete_paths() {
        let bundle = bundle();
        assert_eq!(bundle.lookup("common"), None);
        assert_eq!(bundle.lookup("dashboard.count"), None);
        assert_eq!(bundle.lookup("common.save.extra"), None);
        assert_eq!(bundle.lookup("missing.key"), None);
        assert_eq!(bundle.lookup(""), None);
    }

    #[test]
    fn test_keys_only_string_leaves() {
        let keys: Vec<String> = bundle().keys().into_iter().collect();
        assert_eq!(
            keys,
            vec![
                "common.cancel",
                "common.save",
                "dashboard.kpi.revenue",
                "title"
            ]
        );
    }

    #[test]
    fn test_non_object_bundle_rejected() {
        let err = Bundle::from_value(Language::Ru, json!(["a"])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_record_serializes_as_plain_object() {
        let mut record = Record::new();
        record.insert("b", 1);
        record.insert("a", "x");
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"b":1,"a":"x"}"#);
    }
}
