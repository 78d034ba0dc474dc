//! PostgREST client (the REST surface of a hosted Supabase project).
//!
//! Rows live under `{base_url}/rest/v1/{table}`. Every request carries the
//! project key both as `apikey` and as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use configs::StoreConfig;

use super::{Filter, Row, StoreError, TableStore};

const REST_PREFIX: &str = "rest/v1";

/// Error object PostgREST returns with non-2xx responses.
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    key: String,
}

impl PostgrestStore {
    pub fn new(base_url: &str, key: &str, connect_timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    pub fn from_config(cfg: &StoreConfig) -> Result<Self, StoreError> {
        Self::new(&cfg.url, &cfg.key, Duration::from_secs(cfg.connect_timeout_secs))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PREFIX, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    fn returning(req: RequestBuilder) -> RequestBuilder {
        req.header("Prefer", "return=representation")
    }

    async fn send(&self, req: RequestBuilder) -> Result<Vec<Row>, StoreError> {
        let resp = req
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        debug!(status = status.as_u16(), len = bytes.len(), "store response");

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &bytes));
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(obj @ Value::Object(_)) => Ok(vec![obj]),
            Ok(other) => Err(StoreError::Decode(format!("expected rows, got {other}"))),
            Err(e) => Err(StoreError::Decode(e.to_string())),
        }
    }
}

fn api_error(status: u16, body: &[u8]) -> StoreError {
    match serde_json::from_slice::<PostgrestErrorBody>(body) {
        Ok(b) => {
            let mut message = b.message.unwrap_or_else(|| format!("HTTP {status}"));
            if let Some(details) = b.details.filter(|d| !d.is_empty()) {
                message = format!("{message} ({details})");
            }
            if let Some(hint) = b.hint.filter(|h| !h.is_empty()) {
                message = format!("{message}; hint: {hint}");
            }
            StoreError::Api { status, code: b.code, message }
        }
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            let message = if text.is_empty() { format!("HTTP {status}") } else { text };
            StoreError::Api { status, code: None, message }
        }
    }
}

#[async_trait]
impl TableStore for PostgrestStore {
    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError> {
        let req = Self::returning(self.request(Method::POST, table)).json(&row);
        self.send(req).await
    }

    async fn select(&self, table: &str, filter: Option<&Filter>) -> Result<Vec<Row>, StoreError> {
        let mut req = self.request(Method::GET, table).query(&[("select", "*")]);
        if let Some(f) = filter {
            req = req.query(&[(f.column.as_str(), f.operand())]);
        }
        self.send(req).await
    }

    async fn update(&self, table: &str, filter: &Filter, row: Row) -> Result<Vec<Row>, StoreError> {
        let req = Self::returning(self.request(Method::PATCH, table))
            .query(&[(filter.column.as_str(), filter.operand())])
            .json(&row);
        self.send(req).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        let req = Self::returning(self.request(Method::DELETE, table))
            .query(&[(filter.column.as_str(), filter.operand())]);
        self.send(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const KEY: &str = "test-key";

    fn store_for(server: &mockito::Server) -> PostgrestStore {
        PostgrestStore::new(&server.url(), KEY, Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn insert_sends_key_headers_and_returns_rows() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/company_logs")
            .match_header("apikey", KEY)
            .match_header("authorization", "Bearer test-key")
            .match_header("prefer", "return=representation")
            .match_body(Matcher::Json(json!({"task_name": "fix bug"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 1, "task_name": "fix bug"}]"#)
            .create_async()
            .await;

        let rows = store_for(&server)
            .insert("company_logs", json!({"task_name": "fix bug"}))
            .await
            .expect("insert ok");
        mock.assert_async().await;
        assert_eq!(rows, vec![json!({"id": 1, "task_name": "fix bug"})]);
    }

    #[tokio::test]
    async fn select_encodes_eq_filter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/company_tickets")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("id".into(), "eq.7".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let rows = store_for(&server)
            .select("company_tickets", Some(&Filter::eq("id", "7")))
            .await
            .expect("select ok");
        mock.assert_async().await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_use_patch_and_delete() {
        let mut server = mockito::Server::new_async().await;
        let patch = server
            .mock("PATCH", "/rest/v1/company_logs")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.3".into()))
            .match_header("prefer", "return=representation")
            .match_body(Matcher::Json(json!({"task_name": "new"})))
            .with_status(200)
            .with_body(r#"[{"id": 3, "task_name": "new"}]"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/rest/v1/company_logs")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.3".into()))
            .with_status(204)
            .create_async()
            .await;

        let store = store_for(&server);
        let updated = store
            .update("company_logs", &Filter::eq("id", "3"), json!({"task_name": "new"}))
            .await
            .expect("update ok");
        assert_eq!(updated[0]["task_name"], "new");

        let removed = store
            .delete("company_logs", &Filter::eq("id", "3"))
            .await
            .expect("delete ok");
        assert!(removed.is_empty());

        patch.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_not_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/v1/company_logs")
            .with_status(400)
            .with_body(r#"{"code":"23502","message":"null value in column \"task_name\"","details":null,"hint":null}"#)
            .create_async()
            .await;

        let err = store_for(&server)
            .insert("company_logs", json!({}))
            .await
            .expect_err("must fail");
        match err {
            StoreError::Api { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("23502"));
                assert!(message.contains("task_name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_is_kept_as_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/company_logs")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = store_for(&server).select("company_logs", None).await.unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 503, ref message, .. } if message == "upstream unavailable"));
    }

    #[tokio::test]
    async fn unreachable_store_is_transport_error() {
        let store = PostgrestStore::new("http://127.0.0.1:1", KEY, Duration::from_secs(1)).unwrap();
        let err = store.select("company_logs", None).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }
}
