pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_serializes_upper_case_ok() {
        let body = serde_json::to_value(types::Health::ok()).unwrap();
        assert_eq!(body, serde_json::json!({"status": "OK"}));
    }

    #[test]
    fn message_wraps_text() {
        let body = serde_json::to_value(types::Message::new("Item deleted successfully")).unwrap();
        assert_eq!(body["message"], "Item deleted successfully");
    }
}
