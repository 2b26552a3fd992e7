use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single cell of an uploaded contact file.
///
/// Cells are inferred when the file is parsed: empty cells become `Null`,
/// cells whose text is already the canonical form of a number become
/// `Number`, everything else is kept verbatim as `Text`. Zip codes with a
/// leading zero, phone numbers with a `+`, `1e3` or integers too large for
/// `i64` therefore stay text and render exactly as typed.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactValue {
    Null,
    Number(serde_json::Number),
    Text(String),
}

impl ContactValue {
    /// Infers the value of a raw CSV cell.
    pub fn from_cell(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            return ContactValue::Null;
        }
        if let Ok(i) = cell.parse::<i64>() {
            if i.to_string() == cell {
                return ContactValue::Number(i.into());
            }
        } else if let Some(n) = cell
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
        {
            if n.to_string() == cell {
                return ContactValue::Number(n);
            }
        }
        ContactValue::Text(cell.to_string())
    }

    /// Reads a JSON cell. Booleans and nested values are kept as their JSON
    /// text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => ContactValue::Null,
            Value::Number(n) => ContactValue::Number(n.clone()),
            Value::String(s) => ContactValue::Text(s.clone()),
            other => ContactValue::Text(other.to_string()),
        }
    }

    /// Text used when the value is substituted into a template.
    pub fn as_display_text(&self) -> String {
        match self {
            ContactValue::Null => String::new(),
            ContactValue::Number(n) => n.to_string(),
            ContactValue::Text(s) => s.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ContactValue::Null)
    }
}

impl From<ContactValue> for Value {
    fn from(value: ContactValue) -> Self {
        match value {
            ContactValue::Null => Value::Null,
            ContactValue::Number(n) => Value::Number(n),
            ContactValue::Text(s) => Value::String(s),
        }
    }
}

/// One row of an uploaded contact file: column name -> value.
///
/// Column order is the order of the file header; `serde_json` is built with
/// `preserve_order`, so the map keeps it in memory and on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactRecord {
    fields: Map<String, Value>,
}

impl ContactRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column` to `value`, replacing an existing entry in place.
    pub fn insert(&mut self, column: impl Into<String>, value: ContactValue) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<ContactValue> {
        self.fields.get(column).map(ContactValue::from_json)
    }

    /// Column names in header order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ContactValue)> for ContactRecord {
    fn from_iter<I: IntoIterator<Item = (K, ContactValue)>>(iter: I) -> Self {
        let mut record = ContactRecord::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

/// The preview of an uploaded file as served by the file store.
///
/// `contacts` may be missing entirely; the analyzer treats that the same as an
/// empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilePreview {
    #[serde(default)]
    pub contacts: Option<Vec<ContactRecord>>,
}

impl FilePreview {
    pub fn new(contacts: Vec<ContactRecord>) -> Self {
        Self {
            contacts: Some(contacts),
        }
    }

    /// The first record, whose keys define the available columns.
    pub fn first_record(&self) -> Option<&ContactRecord> {
        self.contacts.as_ref().and_then(|c| c.first())
    }
}

/// Metadata of a stored contact file, returned after an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub md5: String,
    pub columns: Vec<String>,
    pub row_count: u32,
}
