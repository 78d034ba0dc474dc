use serde::{Deserialize, Serialize};

use crate::record::{Collection, RecordFields};

/// A `tickets` entry. Tickets carry no owner or status; such keys in a
/// request body are ignored and never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicketFields {
    pub task_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
}

impl RecordFields for TicketFields {
    const COLLECTION: Collection = Collection::Tickets;
    const COLUMNS: &'static [&'static str] = &["task_name", "task_description"];

    fn task_name(&self) -> &str {
        &self.task_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn owner_and_status_are_dropped() {
        let f: TicketFields = serde_json::from_value(json!({
            "task_name": "printer jam",
            "username": "ana",
            "status": "open"
        }))
        .unwrap();
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v, json!({"task_name": "printer jam"}));
    }

    #[test]
    fn empty_task_name_fails_validation() {
        let f = TicketFields { task_name: "".into(), task_description: None };
        assert!(f.validate().is_err());
    }
}
