use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};

use openerp_core::{ListResult, ServiceError};

use crate::model::{CreateProductCode, ProductCode};
use crate::service::code::ListCodesParams;
use super::{AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/codes", post(create_code).get(list_codes))
        .route(
            "/codes/{id}",
            get(get_code).patch(update_code).delete(delete_code),
        )
}

async fn create_code(
    State(svc): State<AppState>,
    Json(body): Json<CreateProductCode>,
) -> Result<Json<ProductCode>, ServiceError> {
    ok_json(svc.create_code(body))
}

async fn list_codes(
    State(svc): State<AppState>,
    Query(params): Query<ListCodesParams>,
) -> Result<Json<ListResult<ProductCode>>, ServiceError> {
    ok_json(svc.list_codes(&params))
}

async fn get_code(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductCode>, ServiceError> {
    ok_json(svc.get_code(&id))
}

async fn update_code(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<ProductCode>, ServiceError> {
    ok_json(svc.update_code(&id, patch))
}

async fn delete_code(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_code(&id)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
