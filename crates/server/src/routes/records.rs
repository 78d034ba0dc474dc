//! CRUD handlers written once over [`RecordFields`] and mounted per collection.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use common::types::Message;
use models::{RecordFields, StoredRecord};
use service::RecordService;

use crate::errors::{JsonApiError, Operation};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub username: Option<String>,
}

/// `/{segment}` and `/{segment}/:key` for the kind `F`.
pub fn record_routes<F: RecordFields>(svc: RecordService<F>) -> Router {
    let segment = F::COLLECTION.route_segment();
    Router::new()
        .route(&format!("/{segment}"), get(list::<F>).post(create::<F>))
        .route(
            &format!("/{segment}/:key"),
            get(get_one::<F>).put(replace::<F>).delete(remove::<F>),
        )
        .with_state(svc)
}

/// Create a record; the response echoes the accepted body.
pub async fn create<F: RecordFields>(
    State(svc): State<RecordService<F>>,
    Json(input): Json<F>,
) -> Result<Json<F>, JsonApiError> {
    svc.create(input)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(Operation::Create, e))
}

/// List the collection, optionally only rows owned by `?username=`.
pub async fn list<F: RecordFields>(
    State(svc): State<RecordService<F>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<StoredRecord<F>>>, JsonApiError> {
    let res = match q.username.as_deref() {
        Some(user) => svc.list_by_owner(user).await,
        None => svc.list().await,
    };
    match res {
        Ok(list) => {
            info!(collection = %F::COLLECTION, count = list.len(), "list records");
            Ok(Json(list))
        }
        Err(e) => Err(JsonApiError::from_service(Operation::List, e)),
    }
}

pub async fn get_one<F: RecordFields>(
    State(svc): State<RecordService<F>>,
    Path(key): Path<String>,
) -> Result<Json<StoredRecord<F>>, JsonApiError> {
    svc.get(&key)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(Operation::Get, e))
}

/// Full replace: optional fields missing from the body are cleared.
pub async fn replace<F: RecordFields>(
    State(svc): State<RecordService<F>>,
    Path(key): Path<String>,
    Json(input): Json<F>,
) -> Result<Json<StoredRecord<F>>, JsonApiError> {
    svc.replace(&key, input)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(Operation::Replace, e))
}

pub async fn remove<F: RecordFields>(
    State(svc): State<RecordService<F>>,
    Path(key): Path<String>,
) -> Result<Json<Message>, JsonApiError> {
    svc.delete(&key)
        .await
        .map(|_| Json(Message::new("Item deleted successfully")))
        .map_err(|e| JsonApiError::from_service(Operation::Delete, e))
}
