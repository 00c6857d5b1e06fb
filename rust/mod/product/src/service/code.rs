use serde::Deserialize;
use tracing::warn;

use openerp_core::{ListResult, now_rfc3339, new_id};
use openerp_sql::{SQLExec, Value};

use crate::model::{CodeType, CreateProductCode, Product, ProductCode};
use super::{
    PRODUCTS, PRODUCT_CODES, ProductError, ProductService, apply_patch, delete_record, get_record,
    insert_record, list_records, update_record,
};

/// Filters for listing product codes.
#[derive(Debug, Clone, Deserialize)]
pub struct ListCodesParams {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub code_type: Option<CodeType>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

impl Default for ListCodesParams {
    fn default() -> Self {
        Self {
            product: None,
            code_type: None,
            active: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl ProductService {
    /// Create one product code.
    pub fn create_code(&self, input: CreateProductCode) -> Result<ProductCode, ProductError> {
        let mut created = self.create_codes(vec![input])?;
        created
            .pop()
            .ok_or_else(|| ProductError::Internal("no code created".into()))
    }

    /// Create several codes atomically. The batch is validated as a whole:
    /// two lines of the same checked type with the same code conflict.
    pub fn create_codes(
        &self,
        inputs: Vec<CreateProductCode>,
    ) -> Result<Vec<ProductCode>, ProductError> {
        let tx = self.sql.begin()?;
        let records = insert_codes(&*tx, inputs)?;
        tx.commit()?;
        Ok(records)
    }

    pub fn get_code(&self, id: &str) -> Result<ProductCode, ProductError> {
        get_record(self.sql.as_ref(), PRODUCT_CODES, id)
    }

    pub fn list_codes(
        &self,
        params: &ListCodesParams,
    ) -> Result<ListResult<ProductCode>, ProductError> {
        let mut where_clauses = vec!["1 = 1".to_string()];
        let mut values = Vec::new();

        if let Some(product) = &params.product {
            values.push(Value::Text(product.clone()));
            where_clauses.push(format!("product_id = ?{}", values.len()));
        }
        if let Some(code_type) = params.code_type {
            values.push(Value::Text(code_type.as_str().to_string()));
            where_clauses.push(format!("code_type = ?{}", values.len()));
        }
        if let Some(active) = params.active {
            values.push(Value::from(active));
            where_clauses.push(format!("active = ?{}", values.len()));
        }

        let (items, total) = list_records(
            self.sql.as_ref(),
            PRODUCT_CODES,
            &where_clauses.join(" AND "),
            values,
            params.limit.min(openerp_core::types::MAX_LIMIT),
            params.offset,
        )?;
        Ok(ListResult { items, total })
    }

    /// Update a code with JSON merge-patch. The result is revalidated.
    pub fn update_code(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<ProductCode, ProductError> {
        let tx = self.sql.begin()?;
        let current: ProductCode = get_record(&*tx, PRODUCT_CODES, id)?;
        let updated: ProductCode = apply_patch(&current, patch, &["id", "created_at"])?;

        if updated.product != current.product {
            ensure_product(&*tx, &updated.product)?;
        }
        ensure_code_present(&updated.code)?;

        update_record(&*tx, PRODUCT_CODES, id, &updated, &code_indexes(&updated))?;
        check_code(&*tx, std::slice::from_ref(&updated))?;
        tx.commit()?;
        Ok(updated)
    }

    pub fn delete_code(&self, id: &str) -> Result<(), ProductError> {
        delete_record(self.sql.as_ref(), PRODUCT_CODES, id)
    }

    /// Run the code checks against the current database state.
    pub fn check_code(&self, records: &[ProductCode]) -> Result<(), ProductError> {
        check_code(self.sql.as_ref(), records)
    }
}

/// Check code length and uniqueness.
///
/// EAN codes must be 13 characters and UPC-A codes 12; both must be unique
/// within their type. `other` codes are not checked. Each record is
/// excluded from its own duplicate search by id.
pub fn check_code<E: SQLExec + ?Sized>(db: &E, records: &[ProductCode]) -> Result<(), ProductError> {
    for record in records {
        let Some(expected) = record.code_type.required_length() else {
            continue;
        };
        if record.code.chars().count() != expected {
            warn!(code = %record.code, code_type = %record.code_type, "rejected code: wrong length");
            return Err(ProductError::WrongCodeLength {
                code_type: record.code_type,
                expected,
            });
        }

        let rows = db.query(
            "SELECT id FROM product_codes WHERE id != ?1 AND code = ?2 AND code_type = ?3 LIMIT 1",
            &[
                Value::Text(record.id.clone()),
                Value::Text(record.code.clone()),
                Value::Text(record.code_type.as_str().to_string()),
            ],
        )?;
        if !rows.is_empty() {
            warn!(code = %record.code, code_type = %record.code_type, "rejected code: duplicate");
            return Err(ProductError::DuplicateCode {
                code: record.code.clone(),
                code_type: record.code_type,
            });
        }
    }
    Ok(())
}

/// Insert code rows, then validate them together.
pub(crate) fn insert_codes<E: SQLExec + ?Sized>(
    db: &E,
    inputs: Vec<CreateProductCode>,
) -> Result<Vec<ProductCode>, ProductError> {
    let now = now_rfc3339();
    let mut records = Vec::with_capacity(inputs.len());

    for input in inputs {
        ensure_code_present(&input.code)?;
        ensure_product(db, &input.product)?;

        let record = ProductCode {
            id: new_id(),
            code: input.code,
            code_type: input.code_type,
            active: input.active,
            product: input.product,
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        insert_record(db, PRODUCT_CODES, &record.id, &record, &code_indexes(&record))?;
        records.push(record);
    }

    check_code(db, &records)?;
    Ok(records)
}

/// Codes owned by a product, in creation order.
pub(crate) fn codes_of<E: SQLExec + ?Sized>(
    db: &E,
    product_id: &str,
) -> Result<Vec<ProductCode>, ProductError> {
    let (items, _) = list_records(
        db,
        PRODUCT_CODES,
        "product_id = ?1",
        vec![Value::Text(product_id.to_string())],
        usize::MAX >> 1,
        0,
    )?;
    Ok(items)
}

fn code_indexes(record: &ProductCode) -> Vec<(&'static str, Value)> {
    vec![
        ("product_id", Value::Text(record.product.clone())),
        ("code", Value::Text(record.code.clone())),
        ("code_type", Value::Text(record.code_type.as_str().to_string())),
        ("active", Value::from(record.active)),
        ("created_at", Value::Text(record.created_at.clone())),
        ("updated_at", Value::Text(record.updated_at.clone())),
    ]
}

fn ensure_code_present(code: &str) -> Result<(), ProductError> {
    if code.is_empty() {
        return Err(ProductError::Validation("code is required".into()));
    }
    Ok(())
}

fn ensure_product<E: SQLExec + ?Sized>(db: &E, product_id: &str) -> Result<(), ProductError> {
    match get_record::<E, Product>(db, PRODUCTS, product_id) {
        Ok(_) => Ok(()),
        Err(ProductError::NotFound(_)) => Err(ProductError::Validation(format!(
            "product '{}' does not exist",
            product_id
        ))),
        Err(e) => Err(e),
    }
}
