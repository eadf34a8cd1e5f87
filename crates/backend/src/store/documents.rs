//! Firestore document encoding for pantry records.
//!
//! Every field is stored as a `stringValue`:
//!
//! ```json
//! {
//!   "name": "projects/p/databases/(default)/documents/pantry/8Gk2",
//!   "fields": {
//!     "name": { "stringValue": "Milk" },
//!     "expiryDate": { "stringValue": "15/6/2025" },
//!     "category": { "stringValue": "Süt Ürünleri" },
//!     "userId": { "stringValue": "uid-1" }
//!   }
//! }
//! ```
//!
//! Missing fields decode as empty strings.

use serde::{Deserialize, Serialize};
use smart_pantry_core::{Category, ExpiryDate, NewPantryRecord, OwnerId, PantryRecord, RecordId};
use tracing::warn;

use super::StoreError;

/// Field the owner filter runs on.
pub(super) const OWNER_FIELD: &str = "userId";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct StringValue {
    #[serde(rename = "stringValue", default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
}

impl StringValue {
    fn new(value: &str) -> Self {
        Self {
            string_value: Some(value.to_string()),
        }
    }

    fn into_string(self) -> String {
        self.string_value.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Fields {
    #[serde(default)]
    pub name: StringValue,
    #[serde(default)]
    pub expiry_date: StringValue,
    #[serde(default)]
    pub category: StringValue,
    #[serde(default)]
    pub user_id: StringValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct Document {
    /// Full resource name. Absent on create requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Fields,
}

/// One element of a `:runQuery` response. Elements without a document only
/// carry read metadata.
#[derive(Debug, Deserialize)]
pub(super) struct RunQueryItem {
    #[serde(default)]
    pub document: Option<Document>,
}

/// Body for creating `record`.
pub(super) fn encode(record: &NewPantryRecord) -> Document {
    Document {
        name: None,
        fields: Fields {
            name: StringValue::new(&record.name),
            expiry_date: StringValue::new(record.expiry_date.as_str()),
            category: StringValue::new(record.category.label()),
            user_id: StringValue::new(record.owner_id.as_str()),
        },
    }
}

/// The document ID: last segment of the resource name.
pub(super) fn document_id(name: &str) -> Option<&str> {
    name.rsplit('/').next().filter(|id| !id.is_empty())
}

pub(super) fn decode(document: Document) -> Result<PantryRecord, StoreError> {
    let name = document
        .name
        .ok_or_else(|| StoreError::Parse("document has no name".to_string()))?;
    let id = document_id(&name)
        .ok_or_else(|| StoreError::Parse(format!("malformed document name: {name}")))?;
    let fields = document.fields;

    Ok(PantryRecord {
        id: RecordId::new(id),
        name: fields.name.into_string(),
        expiry_date: ExpiryDate::new(fields.expiry_date.into_string()),
        category: Category::from(fields.category.into_string()),
        owner_id: OwnerId::new(fields.user_id.into_string()),
    })
}

/// Records in a `:runQuery` response. Documents that fail to decode are
/// skipped.
pub(super) fn decode_query(items: Vec<RunQueryItem>) -> Vec<PantryRecord> {
    items
        .into_iter()
        .filter_map(|item| item.document)
        .filter_map(|document| match decode(document) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable document");
                None
            }
        })
        .collect()
}

/// Structured query selecting `owner`'s documents in `collection`.
pub(super) fn owner_query(collection: &str, owner: &OwnerId) -> serde_json::Value {
    serde_json::json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": OWNER_FIELD },
                    "op": "EQUAL",
                    "value": { "stringValue": owner.as_str() }
                }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map a non-success response to [`StoreError::Api`].
pub(super) fn api_error(status: u16, body: &str) -> StoreError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map_or_else(|_| body.trim().to_string(), |envelope| envelope.error.message);
    StoreError::Api { status, message }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn milk() -> NewPantryRecord {
        NewPantryRecord {
            name: "Milk".to_string(),
            expiry_date: ExpiryDate::new("15/6/2025"),
            category: Category::Dairy,
            owner_id: OwnerId::new("uid-1"),
        }
    }

    #[test]
    fn test_encode_wire_shape() {
        let json = serde_json::to_value(encode(&milk())).unwrap();
        assert!(json.get("name").is_none());
        assert_eq!(json["fields"]["name"]["stringValue"], "Milk");
        assert_eq!(json["fields"]["expiryDate"]["stringValue"], "15/6/2025");
        assert_eq!(json["fields"]["category"]["stringValue"], "Süt Ürünleri");
        assert_eq!(json["fields"]["userId"]["stringValue"], "uid-1");
    }

    #[test]
    fn test_decode_takes_id_from_name() {
        let mut document = encode(&milk());
        document.name =
            Some("projects/kiler/databases/(default)/documents/pantry/8Gk2aQ".to_string());
        let record = decode(document).unwrap();
        assert_eq!(record.id.as_str(), "8Gk2aQ");
        assert_eq!(record, milk().with_id(RecordId::new("8Gk2aQ")));
    }

    #[test]
    fn test_decode_defaults_missing_fields() {
        let body = r#"{
            "name": "projects/p/databases/(default)/documents/pantry/x1",
            "fields": { "name": { "stringValue": "Olives" }, "tags": { "arrayValue": {} } },
            "createTime": "2025-06-01T10:00:00Z"
        }"#;
        let record = decode(serde_json::from_str(body).unwrap()).unwrap();
        assert_eq!(record.name, "Olives");
        assert!(record.expiry_date.is_blank());
        assert_eq!(record.category, Category::Custom(String::new()));
        assert_eq!(record.owner_id.as_str(), "");
    }

    #[test]
    fn test_decode_requires_name() {
        assert!(matches!(
            decode(encode(&milk())),
            Err(StoreError::Parse(_))
        ));
        let mut trailing = encode(&milk());
        trailing.name = Some("projects/p/databases/(default)/documents/pantry/".to_string());
        assert!(decode(trailing).is_err());
    }

    #[test]
    fn test_decode_query_skips_metadata_and_bad_documents() {
        let body = r#"[
            { "document": {
                "name": "projects/p/databases/(default)/documents/pantry/a",
                "fields": { "name": { "stringValue": "Bread" } }
              }, "readTime": "2025-06-14T09:00:00Z" },
            { "document": { "fields": {} } },
            { "readTime": "2025-06-14T09:00:00Z" }
        ]"#;
        let records = decode_query(serde_json::from_str(body).unwrap());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Bread");
    }

    #[test]
    fn test_owner_query_filters_on_user_id() {
        let query = owner_query("pantry", &OwnerId::new("uid-1"));
        let filter = &query["structuredQuery"]["where"]["fieldFilter"];
        assert_eq!(query["structuredQuery"]["from"][0]["collectionId"], "pantry");
        assert_eq!(filter["field"]["fieldPath"], "userId");
        assert_eq!(filter["op"], "EQUAL");
        assert_eq!(filter["value"]["stringValue"], "uid-1");
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#;
        assert!(matches!(
            api_error(403, body),
            StoreError::Api { status: 403, ref message } if message == "Missing or insufficient permissions."
        ));
        assert!(matches!(
            api_error(500, "boom\n"),
            StoreError::Api { status: 500, ref message } if message == "boom"
        ));
    }
}
