//! In-process table store for tests and local runs without a hosted database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{Filter, Row, StoreError, TableStore};

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Row>>>, // insertion order per table
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Row>>>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Transport("memory store poisoned".into()))
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    match row.get(&filter.column) {
        Some(Value::String(s)) => *s == filter.value,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == filter.value,
    }
}

fn as_object(row: Row) -> Result<serde_json::Map<String, Value>, StoreError> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Api {
            status: 400,
            code: None,
            message: format!("row must be a JSON object, got {other}"),
        }),
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError> {
        let mut obj = as_object(row)?;
        obj.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        let stored = Value::Object(obj);
        let mut tables = self.lock()?;
        tables.entry(table.to_string()).or_default().push(stored.clone());
        Ok(vec![stored])
    }

    async fn select(&self, table: &str, filter: Option<&Filter>) -> Result<Vec<Row>, StoreError> {
        let tables = self.lock()?;
        let rows = tables.get(table).map(Vec::as_slice).unwrap_or_default();
        Ok(rows
            .iter()
            .filter(|r| filter.map_or(true, |f| matches(r, f)))
            .cloned()
            .collect())
    }

    async fn update(&self, table: &str, filter: &Filter, row: Row) -> Result<Vec<Row>, StoreError> {
        let patch = as_object(row)?;
        let mut tables = self.lock()?;
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for r in rows.iter_mut().filter(|r| matches(r, filter)) {
                if let Value::Object(existing) = r {
                    for (k, v) in &patch {
                        if k != "id" {
                            existing.insert(k.clone(), v.clone());
                        }
                    }
                }
                updated.push(r.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.lock()?;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let (removed, kept): (Vec<Row>, Vec<Row>) =
            rows.drain(..).partition(|r| matches(r, filter));
        *rows = kept;
        Ok(removed)
    }
}
