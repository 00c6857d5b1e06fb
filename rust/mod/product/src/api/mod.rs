pub mod codes;
pub mod products;

use std::sync::Arc;

use axum::{Json, Router};
use serde::Serialize;

use openerp_core::ServiceError;

use crate::service::{ProductError, ProductService};

/// Shared application state.
pub type AppState = Arc<ProductService>;

/// Build the product API router. Paths are relative to the module prefix.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(products::routes())
        .merge(codes::routes())
        .with_state(state)
}

/// Wrap a service result into an API response.
pub(crate) fn ok_json<T: Serialize>(result: Result<T, ProductError>) -> Result<Json<T>, ServiceError> {
    result.map(Json).map_err(ServiceError::from)
}
