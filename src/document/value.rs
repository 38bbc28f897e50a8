use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use uuid::Uuid;

/// A single document field value.
///
/// The closed set of value kinds the schema engine understands. Scalar kinds
/// map one-to-one onto semantic property types; `Object` and `Array` drive
/// complex-type and collection inference.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    TimeSpan(Duration),
    Guid(Uuid),
    Bytes(Vec<u8>),
    Array(Vec<DocumentValue>),
    Object(Document),
}

impl DocumentValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DocumentValue::Null)
    }

    /// Convert a JSON value into the closed union.
    ///
    /// Strings carrying an RFC 3339 date-time or a UUID are recognized here,
    /// so the resolver downstream sees semantic scalars rather than opaque
    /// text. Anything else stays a plain string.
    pub fn from_json(value: serde_json::Value) -> DocumentValue {
        match value {
            serde_json::Value::Null => DocumentValue::Null,
            serde_json::Value::Bool(b) => DocumentValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DocumentValue::Int(i)
                } else {
                    DocumentValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Self::from_string(s),
            serde_json::Value::Array(items) => {
                DocumentValue::Array(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let mut doc = Document::new();
                for (name, item) in map {
                    doc.set(name, Self::from_json(item));
                }
                DocumentValue::Object(doc)
            }
        }
    }

    fn from_string(s: String) -> DocumentValue {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
            return DocumentValue::DateTime(dt.with_timezone(&Utc));
        }
        if let Ok(guid) = Uuid::parse_str(&s) {
            return DocumentValue::Guid(guid);
        }
        DocumentValue::String(s)
    }

    /// Render the value back into JSON.
    ///
    /// Date-times serialize as RFC 3339, GUIDs as hyphenated strings, byte
    /// sequences as base64 and time spans as fractional seconds.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            DocumentValue::Null => serde_json::Value::Null,
            DocumentValue::Bool(b) => serde_json::Value::Bool(*b),
            DocumentValue::Int(i) => serde_json::Value::from(*i),
            DocumentValue::Float(f) => serde_json::Value::from(*f),
            DocumentValue::String(s) => serde_json::Value::from(s.clone()),
            DocumentValue::DateTime(dt) => {
                serde_json::Value::from(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            DocumentValue::TimeSpan(ts) => {
                serde_json::Value::from(ts.num_milliseconds() as f64 / 1000.0)
            }
            DocumentValue::Guid(guid) => serde_json::Value::from(guid.to_string()),
            DocumentValue::Bytes(bytes) => serde_json::Value::from(BASE64.encode(bytes)),
            DocumentValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(DocumentValue::to_json).collect())
            }
            DocumentValue::Object(doc) => doc.to_json(),
        }
    }
}

/// A raw document: named field values in source order.
///
/// Field order matters: the schema builder registers properties in the
/// order the first document presents them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Vec<(String, DocumentValue)>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    /// Parse a JSON object into a document. Returns `None` for non-object roots.
    pub fn from_json(value: serde_json::Value) -> Option<Document> {
        match DocumentValue::from_json(value) {
            DocumentValue::Object(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json());
        }
        serde_json::Value::Object(map)
    }

    /// Set a field value, replacing any previous value under the same name.
    /// A replaced field keeps its original position.
    pub fn set(&mut self, name: impl Into<String>, value: DocumentValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DocumentValue> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &DocumentValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for Document {
    type Item = (String, DocumentValue);
    type IntoIter = std::vec::IntoIter<(String, DocumentValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
