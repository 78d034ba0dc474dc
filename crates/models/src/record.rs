use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ModelError;

/// The two logical collections served by the API.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collection {
    Logs,
    Tickets,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Logs => "logs",
            Collection::Tickets => "tickets",
        }
    }

    /// First path segment the collection is mounted under.
    pub fn route_segment(&self) -> &'static str {
        match self {
            Collection::Logs => "items",
            Collection::Tickets => "tickets",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capabilities of one record kind.
///
/// The implementing struct is the client-writable part of a row: it is the
/// request body for create/replace and the payload sent to the store.
/// Unset optional fields are left out when serialized; `COLUMNS` lists every
/// writable column so a store payload can spell them out as null.
pub trait RecordFields:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    const COLLECTION: Collection;

    const COLUMNS: &'static [&'static str];

    /// Column holding the owning user, when the kind has one.
    const OWNER_COLUMN: Option<&'static str> = None;

    fn task_name(&self) -> &str;

    fn validate(&self) -> Result<(), ModelError> {
        validate_task_name(self.task_name())
    }
}

pub fn validate_task_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("task_name must not be empty".into()));
    }
    Ok(())
}

/// Identifier assigned by the remote store. Kept as the raw JSON value so
/// numeric and uuid primary keys both round-trip unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Value);

impl RecordId {
    /// Text form used in equality filters and URLs.
    pub fn as_key(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

/// A row as returned by the store: its id plus the kind's fields.
/// Other server-managed columns are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "F: RecordFields")]
pub struct StoredRecord<F> {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: F,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LogFields, TicketFields};
    use serde_json::json;

    #[test]
    fn blank_task_name_is_invalid() {
        assert!(validate_task_name("fix bug").is_ok());
        assert!(matches!(validate_task_name("   "), Err(ModelError::Validation(_))));
    }

    #[test]
    fn record_id_key_for_numbers_and_strings() {
        assert_eq!(RecordId(json!(42)).as_key(), "42");
        assert_eq!(RecordId(json!("0b7c")).as_key(), "0b7c");
    }

    #[test]
    fn stored_record_ignores_server_columns() {
        let row = json!({
            "id": 7,
            "task_name": "fix bug",
            "task_description": "null ref",
            "username": "ana",
            "status": "open",
            "time_date": "2024-05-01T10:00:00Z"
        });
        let rec: StoredRecord<LogFields> = serde_json::from_value(row).unwrap();
        assert_eq!(rec.id, RecordId(json!(7)));
        assert_eq!(rec.fields.username.as_deref(), Some("ana"));

        let out = serde_json::to_value(&rec).unwrap();
        assert_eq!(out["id"], 7);
        assert_eq!(out["task_name"], "fix bug");
        assert!(out.get("time_date").is_none());
    }

    #[test]
    fn collections_mount_under_their_segments() {
        assert_eq!(LogFields::COLLECTION.route_segment(), "items");
        assert_eq!(TicketFields::COLLECTION.route_segment(), "tickets");
        assert_eq!(LogFields::OWNER_COLUMN, Some("username"));
        assert_eq!(TicketFields::OWNER_COLUMN, None);
    }
}
