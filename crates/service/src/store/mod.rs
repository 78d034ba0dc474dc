//! Table-scoped access to the remote store.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod memory;
pub mod postgrest;

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;

/// One JSON object per table row.
pub type Row = Value;

/// Single-column equality filter (`column = value`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self { column: column.into(), value: value.into() }
    }

    /// PostgREST encoding of the right-hand side, e.g. `eq.42`.
    pub fn operand(&self) -> String {
        format!("eq.{}", self.value)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(String),
    #[error("store returned {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("cannot decode store response: {0}")]
    Decode(String),
}

/// Repository abstraction over the hosted table API. Every method is exactly
/// one remote call and returns the rows the store reports as affected.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError>;
    async fn select(&self, table: &str, filter: Option<&Filter>) -> Result<Vec<Row>, StoreError>;
    async fn update(&self, table: &str, filter: &Filter, row: Row) -> Result<Vec<Row>, StoreError>;
    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError>;
}
