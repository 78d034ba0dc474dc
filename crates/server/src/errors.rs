use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::warn;

/// JSON error body: `{"error": <title>, "detail": <message>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, detail: Option<String>) -> Self {
        Self { status, error, detail }
    }

    /// Map a service failure for `op`. Store problems collapse into one
    /// generic 500 whose detail names the failed operation only.
    pub fn from_service(op: Operation, e: ServiceError) -> Self {
        match e {
            ServiceError::Model(m) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "Validation Error", Some(m.to_string()))
            }
            ServiceError::Validation(msg) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg))
            }
            ServiceError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "Not Found", Some("Item not found".into()))
            }
            ServiceError::NoRowMatched(what) => {
                warn!(%what, "replace matched no row");
                Self::internal(op)
            }
            ServiceError::Store(_) => Self::internal(op),
        }
    }

    fn internal(op: Operation) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            Some(op.failure_message().into()),
        )
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({"error": self.error, "detail": self.detail});
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    List,
    Get,
    Replace,
    Delete,
}

impl Operation {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Create => "Failed to create item",
            Operation::List => "Failed to list items",
            Operation::Get => "Failed to fetch item",
            Operation::Replace => "Failed to update item",
            Operation::Delete => "Failed to delete item",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;
    use service::store::StoreError;

    #[test]
    fn status_per_error_kind() {
        let cases = [
            (ServiceError::Model(ModelError::Validation("x".into())), StatusCode::UNPROCESSABLE_ENTITY),
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("logs"), StatusCode::NOT_FOUND),
            (ServiceError::NoRowMatched("company_logs id 9".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Store(StoreError::Transport("down".into())), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from_service(Operation::Replace, err).status, status);
        }
    }

    #[test]
    fn store_details_are_not_leaked() {
        let err = ServiceError::Store(StoreError::Api {
            status: 401,
            code: None,
            message: "Invalid API key".into(),
        });
        let mapped = JsonApiError::from_service(Operation::Create, err);
        assert_eq!(mapped.detail.as_deref(), Some("Failed to create item"));
    }
}
