use std::marker::PhantomData;
use std::sync::Arc;

use models::{RecordFields, StoredRecord};
use serde_json::Value;
use tracing::{error, info};

use crate::errors::ServiceError;
use crate::store::{Filter, Row, StoreError, TableStore};

const ID_COLUMN: &str = "id";

/// Postgres error for a value that does not parse as the column type,
/// e.g. `eq.abc` against a bigint id.
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// CRUD for one record kind, backed by one remote table.
///
/// Holds no state besides the shared store handle, so cloning is cheap and
/// every operation is a single store call.
pub struct RecordService<F> {
    store: Arc<dyn TableStore>,
    table: String,
    _kind: PhantomData<fn() -> F>,
}

impl<F> Clone for RecordService<F> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), table: self.table.clone(), _kind: PhantomData }
    }
}

impl<F: RecordFields> RecordService<F> {
    pub fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self { store, table: table.into(), _kind: PhantomData }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Insert a new row. Returns the submitted fields as accepted.
    pub async fn create(&self, fields: F) -> Result<F, ServiceError> {
        fields.validate()?;
        let rows = self
            .store
            .insert(&self.table, to_row(&fields)?)
            .await
            .map_err(|e| self.log_store_error("insert", e))?;
        if let Some(id) = rows.first().and_then(|r| r.get(ID_COLUMN)) {
            info!(collection = %F::COLLECTION, table = %self.table, %id, "record created");
        }
        Ok(fields)
    }

    /// Every row of the collection, in store order.
    pub async fn list(&self) -> Result<Vec<StoredRecord<F>>, ServiceError> {
        let rows = self
            .store
            .select(&self.table, None)
            .await
            .map_err(|e| self.log_store_error("select", e))?;
        decode_rows(rows)
    }

    /// Rows owned by `username`. Only kinds with an owner column support it.
    pub async fn list_by_owner(&self, username: &str) -> Result<Vec<StoredRecord<F>>, ServiceError> {
        let column = F::OWNER_COLUMN.ok_or_else(|| {
            ServiceError::Validation(format!("{} cannot be filtered by username", F::COLLECTION))
        })?;
        let rows = self
            .store
            .select(&self.table, Some(&Filter::eq(column, username)))
            .await
            .map_err(|e| self.log_store_error("select", e))?;
        decode_rows(rows)
    }

    /// First row whose id equals `key`. A key the id column cannot parse
    /// matches nothing.
    pub async fn get(&self, key: &str) -> Result<StoredRecord<F>, ServiceError> {
        let rows = self
            .store
            .select(&self.table, Some(&Filter::eq(ID_COLUMN, key)))
            .await
            .map_err(|e| {
                if is_unparseable_key(&e) {
                    ServiceError::not_found(F::COLLECTION.name())
                } else {
                    self.log_store_error("select", e)
                }
            })?;
        let first = rows
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::not_found(F::COLLECTION.name()))?;
        decode_row(first)
    }

    /// Overwrite every client-writable field of the row with id `key`.
    pub async fn replace(&self, key: &str, fields: F) -> Result<StoredRecord<F>, ServiceError> {
        fields.validate()?;
        let rows = self
            .store
            .update(&self.table, &Filter::eq(ID_COLUMN, key), to_row(&fields)?)
            .await
            .map_err(|e| self.log_store_error("update", e))?;
        let first = rows
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NoRowMatched(format!("{} id {}", self.table, key)))?;
        info!(collection = %F::COLLECTION, table = %self.table, id = %key, "record replaced");
        decode_row(first)
    }

    /// Remove the row with id `key`. Deleting a missing id is not an error.
    pub async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        let removed = self
            .store
            .delete(&self.table, &Filter::eq(ID_COLUMN, key))
            .await
            .map_err(|e| self.log_store_error("delete", e))?;
        info!(
            collection = %F::COLLECTION,
            table = %self.table,
            id = %key,
            removed = removed.len(),
            "record deleted"
        );
        Ok(())
    }

    fn log_store_error(&self, op: &'static str, e: StoreError) -> ServiceError {
        error!(collection = %F::COLLECTION, table = %self.table, op, err = %e, "store call failed");
        ServiceError::Store(e)
    }
}

fn is_unparseable_key(e: &StoreError) -> bool {
    matches!(e, StoreError::Api { code: Some(code), .. } if code == INVALID_TEXT_REPRESENTATION)
}

/// Store payload: every writable column present, unset ones as null, so an
/// update clears them.
fn to_row<F: RecordFields>(fields: &F) -> Result<Row, ServiceError> {
    let mut row = serde_json::to_value(fields).map_err(|e| StoreError::Decode(e.to_string()))?;
    if let Value::Object(map) = &mut row {
        for column in F::COLUMNS {
            map.entry(*column).or_insert(Value::Null);
        }
    }
    Ok(row)
}

fn decode_row<F: RecordFields>(row: Value) -> Result<StoredRecord<F>, ServiceError> {
    serde_json::from_value(row).map_err(|e| StoreError::Decode(e.to_string()).into())
}

fn decode_rows<F: RecordFields>(rows: Vec<Value>) -> Result<Vec<StoredRecord<F>>, ServiceError> {
    rows.into_iter().map(decode_row).collect()
}
