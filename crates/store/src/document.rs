//! Stored documents.

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::Result;

/// A JSON document stored under an id inside a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id, unique within its collection.
    pub id: String,

    /// The document body.
    pub body: serde_json::Value,

    /// When the document was first inserted.
    pub created_at: DateTime<Utc>,

    /// When the document was last written.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates a document from a raw JSON body, timestamped now.
    pub fn new(id: impl Into<String>, body: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            body,
            created_at: now,
            updated_at: now,
        }
    }

    /// Serializes an entity into a document body.
    pub fn from_entity<T: Serialize>(id: impl Into<String>, entity: &T) -> Result<Self> {
        Ok(Self::new(id, serde_json::to_value(entity)?))
    }

    /// Deserializes the body into an entity.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Widget {
        name: String,
        count: u32,
    }

    #[test]
    fn entity_roundtrips_through_document_body() {
        let widget = Widget {
            name: "gear".to_string(),
            count: 3,
        };
        let doc = Document::from_entity("w-1", &widget).unwrap();

        assert_eq!(doc.id, "w-1");
        assert_eq!(doc.body["name"], "gear");
        assert_eq!(doc.decode::<Widget>().unwrap(), widget);
    }

    #[test]
    fn decode_reports_shape_mismatch() {
        let doc = Document::new("w-2", serde_json::json!({"name": 5}));
        assert!(doc.decode::<Widget>().is_err());
    }
}
