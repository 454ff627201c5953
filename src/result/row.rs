//! A single row of a view result

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// One `(key, value, id)` triple from a view result.
///
/// `id` is only present for map (non-reduced) rows; `doc` only when the query
/// asked for `include_docs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    key: Value,
    value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc: Option<Value>,
}

impl Row {
    /// Create a row
    pub fn new(id: Option<String>, key: Value, value: Value) -> Self {
        Self {
            id,
            key,
            value,
            doc: None,
        }
    }

    /// Attach the source document
    #[must_use]
    pub fn with_doc(mut self, doc: Value) -> Self {
        self.doc = Some(doc);
        self
    }

    /// Parse a raw row object from a response
    pub fn from_json(raw: &Value) -> Result<Self> {
        let obj = raw
            .as_object()
            .ok_or_else(|| Error::decode(format!("view row is not an object: {raw}")))?;

        let key = obj
            .get("key")
            .cloned()
            .ok_or_else(|| Error::decode(format!("view row has no 'key': {raw}")))?;

        let id = match obj.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(other) => {
                return Err(Error::decode(format!("view row 'id' is not a string: {other}")))
            }
        };

        let value = obj.get("value").cloned().unwrap_or(Value::Null);
        let doc = obj.get("doc").filter(|d| !d.is_null()).cloned();

        Ok(Self {
            id,
            key,
            value,
            doc,
        })
    }

    /// Source document id (map views only)
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The sort key
    pub fn key(&self) -> &Value {
        &self.key
    }

    /// The emitted value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The source document, when requested with `include_docs`
    pub fn doc(&self) -> Option<&Value> {
        self.doc.as_ref()
    }

    /// Deserialize the emitted value
    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.value)?)
    }

    /// Deserialize the source document
    pub fn doc_as<T: DeserializeOwned>(&self) -> Result<T> {
        let doc = self.doc.as_ref().ok_or_else(|| Error::missing_field("doc"))?;
        Ok(T::deserialize(doc)?)
    }
}
