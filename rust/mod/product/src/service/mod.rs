pub mod code;
pub mod product;
pub mod schema;
pub mod search;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use openerp_core::{ServiceError, merge_patch, now_rfc3339};
use openerp_sql::{SQLError, SQLExec, SQLStore, Value};

use crate::messages;
use crate::model::CodeType;

/// Table holding `product.product` records.
pub(crate) const PRODUCTS: &str = "products";

/// Table holding `product.product.code` records.
pub(crate) const PRODUCT_CODES: &str = "product_codes";

/// Product service error type.
#[derive(Debug, Error)]
pub enum ProductError {
    /// Code length does not match what its type requires.
    #[error("{}", messages::wrong_code_length(.code_type))]
    WrongCodeLength { code_type: CodeType, expected: usize },

    /// Another record already holds this code for this type.
    #[error("{}", messages::duplicate_code(.code, .code_type))]
    DuplicateCode { code: String, code_type: CodeType },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl ProductError {
    /// Message key of a user-correctable error.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            ProductError::WrongCodeLength { code_type, .. } => messages::length_key(code_type),
            ProductError::DuplicateCode { .. } => Some(messages::CODE_UNIQUE),
            _ => None,
        }
    }
}

impl From<SQLError> for ProductError {
    fn from(e: SQLError) -> Self {
        match e {
            SQLError::Unique(m) => ProductError::Conflict(m),
            SQLError::Constraint(m) => ProductError::Validation(m),
            other => ProductError::Storage(other.to_string()),
        }
    }
}

impl From<ProductError> for ServiceError {
    fn from(e: ProductError) -> Self {
        let reason = e.reason();
        match e {
            ProductError::WrongCodeLength { .. } => ServiceError::Validation {
                reason,
                message: e.to_string(),
            },
            ProductError::DuplicateCode { .. } => ServiceError::Conflict {
                reason,
                message: e.to_string(),
            },
            ProductError::NotFound(m) => ServiceError::NotFound(m),
            ProductError::Conflict(m) => ServiceError::conflict(m),
            ProductError::Validation(m) => ServiceError::validation(m),
            ProductError::Storage(m) => ServiceError::Storage(m),
            ProductError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// The product service: products, their codes, and the rules binding them.
pub struct ProductService {
    pub(crate) sql: Arc<dyn SQLStore>,
}

impl ProductService {
    /// Create the service, creating and migrating the schema first.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Arc<Self>, ProductError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql }))
    }
}

// ── Generic record helpers ──
//
// Records are stored as a JSON `data` column next to indexed columns used
// for filtering. Helpers take any executor so they run the same against
// the store or inside a transaction.

/// Insert a record as JSON into a table with indexed columns.
pub(crate) fn insert_record<E: SQLExec + ?Sized, T: Serialize>(
    db: &E,
    table: &str,
    id: &str,
    record: &T,
    indexes: &[(&str, Value)],
) -> Result<(), ProductError> {
    let json = serde_json::to_string(record).map_err(|e| ProductError::Internal(e.to_string()))?;

    let mut cols = vec!["id", "data"];
    let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
    let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

    for (i, (col, val)) in indexes.iter().enumerate() {
        cols.push(*col);
        placeholders.push(format!("?{}", i + 3));
        params.push(val.clone());
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        cols.join(", "),
        placeholders.join(", "),
    );
    db.exec(&sql, &params)?;
    Ok(())
}

/// Get a record by id, deserializing the JSON `data` column.
pub(crate) fn get_record<E: SQLExec + ?Sized, T: DeserializeOwned>(
    db: &E,
    table: &str,
    id: &str,
) -> Result<T, ProductError> {
    let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
    let rows = db.query(&sql, &[Value::Text(id.to_string())])?;
    let row = rows
        .first()
        .ok_or_else(|| ProductError::NotFound(format!("{}/{}", table, id)))?;
    decode_data(row)
}

/// Update a record's JSON data and indexed columns.
pub(crate) fn update_record<E: SQLExec + ?Sized, T: Serialize>(
    db: &E,
    table: &str,
    id: &str,
    record: &T,
    indexes: &[(&str, Value)],
) -> Result<(), ProductError> {
    let json = serde_json::to_string(record).map_err(|e| ProductError::Internal(e.to_string()))?;

    let mut sets = vec!["data = ?1".to_string()];
    let mut params = vec![Value::Text(json)];

    for (i, (col, val)) in indexes.iter().enumerate() {
        sets.push(format!("{} = ?{}", col, i + 2));
        params.push(val.clone());
    }

    let id_idx = params.len() + 1;
    params.push(Value::Text(id.to_string()));

    let sql = format!("UPDATE {} SET {} WHERE id = ?{}", table, sets.join(", "), id_idx);
    if db.exec(&sql, &params)? == 0 {
        return Err(ProductError::NotFound(format!("{}/{}", table, id)));
    }
    Ok(())
}

/// Delete a record by id.
pub(crate) fn delete_record<E: SQLExec + ?Sized>(
    db: &E,
    table: &str,
    id: &str,
) -> Result<(), ProductError> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", table);
    if db.exec(&sql, &[Value::Text(id.to_string())])? == 0 {
        return Err(ProductError::NotFound(format!("{}/{}", table, id)));
    }
    Ok(())
}

/// Select records matching `where_sql`, returning one page plus the total
/// match count. Rows come back in creation order.
pub(crate) fn list_records<E: SQLExec + ?Sized, T: DeserializeOwned>(
    db: &E,
    table: &str,
    where_sql: &str,
    mut params: Vec<Value>,
    limit: usize,
    offset: usize,
) -> Result<(Vec<T>, usize), ProductError> {
    let count_sql = format!("SELECT COUNT(*) AS cnt FROM {} WHERE {}", table, where_sql);
    let total = db
        .query(&count_sql, &params)?
        .first()
        .and_then(|r| r.get_i64("cnt"))
        .unwrap_or(0) as usize;

    let limit_idx = params.len() + 1;
    let offset_idx = params.len() + 2;
    params.push(Value::Integer(limit as i64));
    params.push(Value::Integer(offset as i64));

    let sql = format!(
        "SELECT data FROM {} WHERE {} ORDER BY created_at, rowid LIMIT ?{} OFFSET ?{}",
        table, where_sql, limit_idx, offset_idx,
    );
    let rows = db.query(&sql, &params)?;
    let items = rows.iter().map(decode_data).collect::<Result<Vec<T>, _>>()?;
    Ok((items, total))
}

fn decode_data<T: DeserializeOwned>(row: &openerp_sql::Row) -> Result<T, ProductError> {
    let data = row
        .get_str("data")
        .ok_or_else(|| ProductError::Internal("missing data column".into()))?;
    serde_json::from_str(data).map_err(|e| ProductError::Internal(e.to_string()))
}

/// Apply a JSON merge-patch to a record, keeping `protected` fields and
/// refreshing `updated_at`.
pub(crate) fn apply_patch<T: Serialize + DeserializeOwned>(
    current: &T,
    mut patch: serde_json::Value,
    protected: &[&str],
) -> Result<T, ProductError> {
    let obj = patch
        .as_object_mut()
        .ok_or_else(|| ProductError::Validation("patch must be a JSON object".into()))?;
    for field in protected {
        obj.remove(*field);
    }
    obj.insert("updated_at".into(), serde_json::json!(now_rfc3339()));

    let mut json = serde_json::to_value(current).map_err(|e| ProductError::Internal(e.to_string()))?;
    merge_patch(&mut json, &patch);
    serde_json::from_value(json).map_err(|e| ProductError::Validation(e.to_string()))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use openerp_sql::SqliteStore;

    use super::ProductService;

    pub fn test_service() -> Arc<ProductService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        ProductService::new(sql).unwrap()
    }
}
