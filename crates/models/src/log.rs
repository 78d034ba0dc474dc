use serde::{Deserialize, Serialize};

use crate::record::{Collection, RecordFields};

/// A `logs` entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogFields {
    pub task_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl RecordFields for LogFields {
    const COLLECTION: Collection = Collection::Logs;
    const COLUMNS: &'static [&'static str] =
        &["task_name", "task_description", "username", "status"];
    const OWNER_COLUMN: Option<&'static str> = Some("username");

    fn task_name(&self) -> &str {
        &self.task_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_default_to_none() {
        let f: LogFields = serde_json::from_value(json!({"task_name": "deploy"})).unwrap();
        assert_eq!(f.task_description, None);
        assert_eq!(f.username, None);
        assert!(f.validate().is_ok());
    }

    #[test]
    fn task_name_is_required() {
        let res = serde_json::from_value::<LogFields>(json!({"task_description": "x"}));
        assert!(res.is_err());
    }

    #[test]
    fn unset_fields_are_left_out() {
        let f = LogFields {
            task_name: "deploy".into(),
            task_description: None,
            username: Some("ana".into()),
            status: None,
        };
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v, json!({"task_name": "deploy", "username": "ana"}));
    }
}
