use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use openerp_core::{ListParams, ListResult, ServiceError};

use crate::domain::Operator;
use crate::model::{CopyDefaults, CreateProduct, Product, ProductCode};
use super::{AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product).get(list_products))
        .route("/products/@copy", post(copy_products))
        .route("/products/@search", post(search_products))
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/products/{id}/codes", get(product_codes))
}

#[derive(Deserialize)]
struct CopyBody {
    ids: Vec<String>,
    #[serde(default)]
    default: CopyDefaults,
}

#[derive(Deserialize)]
struct SearchBody {
    operator: Operator,
    value: String,
}

async fn create_product(
    State(svc): State<AppState>,
    Json(body): Json<CreateProduct>,
) -> Result<Json<Product>, ServiceError> {
    ok_json(svc.create_product(body))
}

async fn list_products(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<Product>>, ServiceError> {
    ok_json(svc.list_products(&params))
}

async fn get_product(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ServiceError> {
    ok_json(svc.get_product(&id))
}

async fn update_product(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Product>, ServiceError> {
    ok_json(svc.update_product(&id, patch))
}

async fn delete_product(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_product(&id)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

async fn product_codes(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProductCode>>, ServiceError> {
    ok_json(svc.product_codes(&id))
}

async fn copy_products(
    State(svc): State<AppState>,
    Json(body): Json<CopyBody>,
) -> Result<Json<Vec<Product>>, ServiceError> {
    ok_json(svc.copy_products(&body.ids, body.default))
}

async fn search_products(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
    Json(body): Json<SearchBody>,
) -> Result<Json<ListResult<Product>>, ServiceError> {
    ok_json(svc.name_search(body.operator, &body.value, &params))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::api::testing::{app, call};

    #[tokio::test]
    async fn product_crud() {
        let app = app();

        let (status, created) = call(
            &app,
            Method::POST,
            "/products",
            Some(json!({
                "name": "Shoe",
                "codes": [{"code": "1234567890123", "code_type": "ean"}],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["codes"][0]["code_type"], "ean");
        assert_eq!(created["active"], true);

        let (status, fetched) = call(&app, Method::GET, &format!("/products/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, updated) = call(
            &app,
            Method::PATCH,
            &format!("/products/{}", id),
            Some(json!({"description": "Red"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["description"], "Red");

        let (status, list) = call(&app, Method::GET, "/products?limit=10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["total"], 1);

        let (status, _) = call(&app, Method::DELETE, &format!("/products/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, err) = call(&app, Method::GET, &format!("/products/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn invalid_code_line_is_a_validation_error() {
        let app = app();
        let (status, err) = call(
            &app,
            Method::POST,
            "/products",
            Some(json!({
                "name": "Shoe",
                "codes": [{"code": "123", "code_type": "ean"}],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "VALIDATION_FAILED");
        assert_eq!(err["reason"], "wrong_code_length_ean");
        assert_eq!(err["message"], "Wrong code length:\nFor EAN, length should be 13.");
    }

    #[tokio::test]
    async fn copy_and_search() {
        let app = app();
        let (_, created) = call(
            &app,
            Method::POST,
            "/products",
            Some(json!({
                "name": "Shoe",
                "codes": [{"code": "012345678905", "code_type": "upc-a"}],
            })),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, copies) = call(
            &app,
            Method::POST,
            "/products/@copy",
            Some(json!({"ids": [id], "default": {"name": "Shoe (copy)"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(copies[0]["name"], "Shoe (copy)");
        assert_eq!(copies[0]["codes"], json!([]));

        let (status, found) = call(
            &app,
            Method::POST,
            "/products/@search",
            Some(json!({"operator": "=", "value": "012345678905"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["total"], 1);
        assert_eq!(found["items"][0]["id"], id);

        let (_, found) = call(
            &app,
            Method::POST,
            "/products/@search?limit=5",
            Some(json!({"operator": "ilike", "value": "shoe%"})),
        )
        .await;
        assert_eq!(found["total"], 2);

        let copy_id = copies[0]["id"].as_str().unwrap();
        let (status, codes) =
            call(&app, Method::GET, &format!("/products/{}/codes", copy_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(codes, json!([]));
    }
}
