use tracing::info;

use openerp_sql::{SQLExec, TableHandler};

use super::{PRODUCT_CODES, ProductError};

/// SQL DDL statements to initialize the product database schema.
///
/// Each table stores the full JSON document in a `data` TEXT column,
/// with indexed columns extracted for filtering.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT NOT NULL,
        code TEXT,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS product_codes (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
        code TEXT NOT NULL,
        code_type TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_products_name ON products(name)",
    "CREATE INDEX IF NOT EXISTS idx_products_code ON products(code)",
    "CREATE INDEX IF NOT EXISTS idx_product_codes_code ON product_codes(code)",
    "CREATE INDEX IF NOT EXISTS idx_product_codes_product ON product_codes(product_id)",
];

/// Database-level uniqueness on `product_codes.code` from earlier schema
/// versions. Code uniqueness is now enforced per type by `check_code`.
pub(crate) const LEGACY_CODE_CONSTRAINT: &str = "code_uniq";

/// Create missing tables and indexes, then run migrations.
pub fn init_schema<E: SQLExec + ?Sized>(sql: &E) -> Result<(), ProductError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ProductError::Storage(format!("schema init failed: {}", e)))?;
    }
    migrate(sql)
}

fn migrate<E: SQLExec + ?Sized>(sql: &E) -> Result<(), ProductError> {
    let codes = TableHandler::new(sql, PRODUCT_CODES);
    if codes.drop_constraint(LEGACY_CODE_CONSTRAINT)? {
        info!("product: replaced {} by per-type code validation", codes.constraint_name(LEGACY_CODE_CONSTRAINT));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use openerp_sql::SqliteStore;

    use super::*;
    use crate::model::{CodeType, CreateProduct, CreateProductCode};
    use crate::service::ProductService;

    #[test]
    fn init_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        init_schema(&store).unwrap();
        init_schema(&store).unwrap();
        let codes = TableHandler::new(&store, PRODUCT_CODES);
        assert!(codes.table_exists().unwrap());
        assert!(codes.column_exists("code_type").unwrap());
    }

    #[test]
    fn legacy_code_constraint_is_dropped() {
        let store = SqliteStore::open_in_memory().unwrap();
        init_schema(&store).unwrap();
        let codes = TableHandler::new(&store, PRODUCT_CODES);
        codes.add_constraint(LEGACY_CODE_CONSTRAINT, &["code"]).unwrap();
        assert!(codes.constraint_exists(LEGACY_CODE_CONSTRAINT).unwrap());

        let svc = ProductService::new(Arc::new(store)).unwrap();
        let codes = TableHandler::new(svc.sql.as_ref(), PRODUCT_CODES);
        assert!(!codes.constraint_exists(LEGACY_CODE_CONSTRAINT).unwrap());

        // The same freeform code may now appear twice.
        let p = svc.create_product(CreateProduct::named("Widget")).unwrap();
        svc.create_code(CreateProductCode::new(&p.id, "SKU-1", CodeType::Other)).unwrap();
        svc.create_code(CreateProductCode::new(&p.id, "SKU-1", CodeType::Other)).unwrap();
        let rows = svc
            .sql
            .query("SELECT COUNT(*) AS cnt FROM product_codes", &[])
            .unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(2));
    }
}
