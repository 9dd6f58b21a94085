use crate::core::validators::RowValidator;
use crate::domain::mappings::FieldMapping;
use crate::domain::model::{ExportOutcome, ImportResult, Record};
use crate::domain::ports::{FileSource, Storage};
use crate::utils::error::{BizError, Result};
use chrono::{NaiveDate, Utc};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use serde_json::Value;

type DateProvider = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Round-trips record collections to and from CSV/JSON files.
pub struct ImportExportManager<S: Storage> {
    storage: S,
    today: DateProvider,
}

impl<S: Storage> ImportExportManager<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            today: Box::new(|| Utc::now().date_naive()),
        }
    }

    /// 檔名日期來源，測試時固定日期用
    pub fn with_date_provider(
        mut self,
        today: impl Fn() -> NaiveDate + Send + Sync + 'static,
    ) -> Self {
        self.today = Box::new(today);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn download_name(&self, filename: &str, extension: &str) -> String {
        format!(
            "{}_{}.{}",
            filename,
            (self.today)().format("%Y-%m-%d"),
            extension
        )
    }

    /// Writes `{filename}_{date}.csv`. Columns follow `headers`, or the key
    /// order of the first record.
    pub async fn export_to_csv(
        &self,
        records: &[Record],
        filename: &str,
        headers: Option<&[String]>,
    ) -> Result<ExportOutcome> {
        if records.is_empty() {
            tracing::warn!("⚠️ No data to export");
            return Ok(ExportOutcome::NothingToExport);
        }

        let content = render_csv(records, headers)?;
        let name = self.download_name(filename, "csv");
        self.storage.write_file(&name, content.as_bytes()).await?;

        tracing::info!("📤 Exported {} records to {}", records.len(), name);
        Ok(ExportOutcome::Exported {
            filename: name,
            records: records.len(),
        })
    }

    /// Writes `{filename}_{date}.json` as a pretty-printed array.
    pub async fn export_to_json(&self, records: &[Record], filename: &str) -> Result<ExportOutcome> {
        if records.is_empty() {
            tracing::warn!("⚠️ No data to export");
            return Ok(ExportOutcome::NothingToExport);
        }

        let content = serde_json::to_string_pretty(records)?;
        let name = self.download_name(filename, "json");
        self.storage.write_file(&name, content.as_bytes()).await?;

        tracing::info!("📤 Exported {} records to {}", records.len(), name);
        Ok(ExportOutcome::Exported {
            filename: name,
            records: records.len(),
        })
    }

    /// Imports CSV rows, renaming columns through `mapping`. Never fails:
    /// file-level problems come back as a single error with zero counts.
    pub async fn import_from_csv<F, V>(
        &self,
        file: &F,
        mapping: &FieldMapping,
        validator: V,
    ) -> ImportResult
    where
        F: FileSource + ?Sized,
        V: RowValidator,
    {
        let text = match file.read_text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("❌ Failed to read file '{}': {}", file.name(), e);
                return ImportResult::rejected("Failed to read file");
            }
        };

        let result = parse_csv(&text, mapping, &validator);
        log_import(file.name(), &result);
        result
    }

    /// Imports a top-level JSON array, validating every element on its own.
    pub async fn import_from_json<F, V>(&self, file: &F, validator: V) -> ImportResult
    where
        F: FileSource + ?Sized,
        V: RowValidator,
    {
        let text = match file.read_text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("❌ Failed to read file '{}': {}", file.name(), e);
                return ImportResult::rejected("Failed to read file");
            }
        };

        let result = parse_json(&text, &validator);
        log_import(file.name(), &result);
        result
    }
}

fn log_import(name: &str, result: &ImportResult) {
    if result.is_rejected() {
        tracing::warn!("⚠️ Import of '{}' rejected: {}", name, result.errors.join("; "));
        return;
    }
    tracing::info!(
        "📥 Imported {} records from '{}' ({} failed)",
        result.success,
        name,
        result.failed
    );
    for error in &result.errors {
        tracing::debug!("{}", error);
    }
}

/// Renders records as CSV text. Cells holding a comma, a quote or a line
/// break are quoted, with inner quotes doubled.
pub fn render_csv(records: &[Record], headers: Option<&[String]>) -> Result<String> {
    let columns: Vec<String> = match headers {
        Some(headers) => headers.to_vec(),
        None => records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default(),
    };

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(csv_line(&columns)?);
    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| cell_text(record.get(column)))
            .collect();
        lines.push(csv_line(&cells)?);
    }
    Ok(lines.join("\n"))
}

fn csv_line(cells: &[String]) -> Result<String> {
    // 全為空值時不走 writer，單欄才不會寫成 ""
    if cells.iter().all(String::is_empty) {
        return Ok(",".repeat(cells.len().saturating_sub(1)));
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(cells)?;

    let bytes = writer.into_inner().map_err(|e| {
        BizError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    })?;
    let mut line = String::from_utf8(bytes).map_err(|_| BizError::EncodingError {
        name: "csv export".to_string(),
    })?;
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        // 1.0 寫成 1
        Some(Value::Number(n)) if n.is_f64() => n
            .as_f64()
            .map(|f| f.to_string())
            .unwrap_or_else(|| n.to_string()),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Whether a quoted field is still open at the end of `line`. A quote only
/// opens a field when it is the field's first character.
fn ends_inside_quotes(line: &str, continues_quoted: bool) -> bool {
    let mut state = if continues_quoted {
        QuoteState::Quoted
    } else {
        QuoteState::FieldStart
    };
    for c in line.chars() {
        state = match (state, c) {
            (QuoteState::Quoted, '"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, '"') => QuoteState::Quoted,
            (_, ',') => QuoteState::FieldStart,
            (QuoteState::FieldStart, '"') => QuoteState::Quoted,
            _ => QuoteState::Unquoted,
        };
    }
    state == QuoteState::Quoted
}

fn tokenize(chunk: &str) -> Option<StringRecord> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(chunk.as_bytes())
        .records()
        .next()?
        .map_err(|e| tracing::debug!("CSV tokenizer error: {}", e))
        .ok()
}

/// Splits `text` into records, one per non-blank line unless a quoted field
/// spans a line break. A record whose quote never closes yields `None` and
/// parsing resumes on the following line.
fn split_records(text: &str) -> Vec<Option<StringRecord>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut records = Vec::new();
    let mut start = 0;

    while start < lines.len() {
        if lines[start].trim().is_empty() {
            start += 1;
            continue;
        }

        let mut end = start;
        let mut open = ends_inside_quotes(lines[start], false);
        while open && end + 1 < lines.len() {
            end += 1;
            open = ends_inside_quotes(lines[end], true);
        }

        if open {
            records.push(None);
            start += 1;
            continue;
        }

        records.push(tokenize(&lines[start..=end].join("\n")));
        start = end + 1;
    }
    records
}

pub(crate) fn parse_csv<V: RowValidator + ?Sized>(
    text: &str,
    mapping: &FieldMapping,
    validator: &V,
) -> ImportResult {
    let lines = split_records(text);

    if lines.len() < 2 {
        return ImportResult::rejected("Empty or invalid CSV");
    }

    let headers: Vec<String> = match &lines[0] {
        Some(record) => record
            .iter()
            .map(|h| h.trim().replace('"', ""))
            .collect(),
        None => {
            tracing::warn!("⚠️ Unreadable CSV header");
            return ImportResult::rejected("Failed to parse CSV");
        }
    };

    let mut result = ImportResult::default();
    for (index, line) in lines.iter().enumerate().skip(1) {
        // 標題列為第 1 列
        let row = index + 1;
        let Some(values) = line else {
            tracing::debug!("Row {} has an unterminated quoted field", row);
            result.reject(format!("Row {}: Invalid data format", row));
            continue;
        };

        let mut record = Record::new();
        for (column, header) in headers.iter().enumerate() {
            if let Some(field) = mapping.field_for(header) {
                record.insert(field, values.get(column).unwrap_or(""));
            }
        }

        match validator.validate(&record) {
            Some(message) => result.reject(format!("Row {}: {}", row, message)),
            None => result.accept(record),
        }
    }
    result
}

pub(crate) fn parse_json<V: RowValidator + ?Sized>(text: &str, validator: &V) -> ImportResult {
    let items = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(_) => return ImportResult::rejected("JSON must be an array"),
        Err(e) => {
            tracing::warn!("⚠️ Invalid JSON: {}", e);
            return ImportResult::rejected("Failed to parse JSON");
        }
    };

    let mut result = ImportResult::default();
    for (index, item) in items.into_iter().enumerate() {
        let position = index + 1;
        let record = match item {
            Value::Object(map) => Record::from(map),
            _ => {
                result.reject(format!("Item {}: Expected an object", position));
                continue;
            }
        };

        match validator.validate(&record) {
            Some(message) => result.reject(format!("Item {}: {}", position, message)),
            None => result.accept(record),
        }
    }
    result
}
