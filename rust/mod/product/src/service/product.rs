use tracing::info;

use openerp_core::{new_id, now_rfc3339};
use openerp_sql::{SQLExec, Value};

use crate::model::{CodeLine, CopyDefaults, CreateProduct, Product, ProductCode};
use super::code::{codes_of, insert_codes};
use super::{
    PRODUCTS, ProductError, ProductService, apply_patch, get_record, insert_record,
    update_record,
};

impl ProductService {
    /// Create a product together with its initial code lines.
    pub fn create_product(&self, input: CreateProduct) -> Result<Product, ProductError> {
        ensure_name(&input.name)?;

        let now = now_rfc3339();
        let product = Product {
            id: new_id(),
            name: input.name,
            code: input.code,
            description: input.description,
            active: input.active,
            codes: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        let tx = self.sql.begin()?;
        let product = insert_product(&*tx, product, input.codes)?;
        tx.commit()?;
        Ok(product)
    }

    /// Get a product with its codes populated.
    pub fn get_product(&self, id: &str) -> Result<Product, ProductError> {
        load_product(self.sql.as_ref(), id)
    }

    /// Update a product with JSON merge-patch. Codes are managed through
    /// the code operations and cannot be patched here.
    pub fn update_product(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Product, ProductError> {
        let tx = self.sql.begin()?;
        let current: Product = get_record(&*tx, PRODUCTS, id)?;
        let updated: Product = apply_patch(&current, patch, &["id", "created_at", "codes"])?;
        ensure_name(&updated.name)?;

        update_record(&*tx, PRODUCTS, id, &updated, &product_indexes(&updated))?;
        let updated = with_codes(&*tx, updated)?;
        tx.commit()?;
        Ok(updated)
    }

    /// Delete a product and every code it owns.
    pub fn delete_product(&self, id: &str) -> Result<(), ProductError> {
        let tx = self.sql.begin()?;
        let removed = tx.exec(
            "DELETE FROM product_codes WHERE product_id = ?1",
            &[Value::Text(id.to_string())],
        )?;
        if tx.exec("DELETE FROM products WHERE id = ?1", &[Value::Text(id.to_string())])? == 0 {
            return Err(ProductError::NotFound(format!("{}/{}", PRODUCTS, id)));
        }
        tx.commit()?;

        info!("product: deleted {} with {} code(s)", id, removed);
        Ok(())
    }

    /// Duplicate products.
    ///
    /// Each duplicate takes the source's fields, overridden by `defaults`.
    /// Codes are never carried over: a duplicate starts with the code lines
    /// listed in `defaults.codes` and nothing else.
    pub fn copy_products(
        &self,
        ids: &[String],
        defaults: CopyDefaults,
    ) -> Result<Vec<Product>, ProductError> {
        let tx = self.sql.begin()?;
        let mut copies = Vec::with_capacity(ids.len());

        for id in ids {
            let source: Product = get_record(&*tx, PRODUCTS, id)?;
            let now = now_rfc3339();
            let copy = Product {
                id: new_id(),
                name: defaults.name.clone().unwrap_or(source.name),
                code: defaults.code.clone().or(source.code),
                description: defaults.description.clone().or(source.description),
                active: defaults.active.unwrap_or(source.active),
                codes: Vec::new(),
                created_at: now.clone(),
                updated_at: now,
            };
            ensure_name(&copy.name)?;

            let copy = insert_product(&*tx, copy, defaults.codes.clone())?;
            info!("product: copied {} to {} ({} code(s))", id, copy.id, copy.codes.len());
            copies.push(copy);
        }

        tx.commit()?;
        Ok(copies)
    }

    /// Codes owned by a product, in creation order.
    pub fn product_codes(&self, product_id: &str) -> Result<Vec<ProductCode>, ProductError> {
        let _: Product = get_record(self.sql.as_ref(), PRODUCTS, product_id)?;
        codes_of(self.sql.as_ref(), product_id)
    }
}

fn insert_product<E: SQLExec + ?Sized>(
    db: &E,
    mut product: Product,
    lines: Vec<CodeLine>,
) -> Result<Product, ProductError> {
    insert_record(db, PRODUCTS, &product.id, &product, &product_indexes(&product))?;
    let inputs = lines.into_iter().map(|l| l.for_product(&product.id)).collect();
    product.codes = insert_codes(db, inputs)?;
    Ok(product)
}

pub(crate) fn load_product<E: SQLExec + ?Sized>(db: &E, id: &str) -> Result<Product, ProductError> {
    let product: Product = get_record(db, PRODUCTS, id)?;
    with_codes(db, product)
}

pub(crate) fn with_codes<E: SQLExec + ?Sized>(
    db: &E,
    mut product: Product,
) -> Result<Product, ProductError> {
    product.codes = codes_of(db, &product.id)?;
    Ok(product)
}

fn product_indexes(product: &Product) -> Vec<(&'static str, Value)> {
    vec![
        ("name", Value::Text(product.name.clone())),
        ("code", Value::from(product.code.clone())),
        ("active", Value::from(product.active)),
        ("created_at", Value::Text(product.created_at.clone())),
        ("updated_at", Value::Text(product.updated_at.clone())),
    ]
}

fn ensure_name(name: &str) -> Result<(), ProductError> {
    if name.trim().is_empty() {
        return Err(ProductError::Validation("name is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeType, CreateProductCode};
    use crate::service::code::ListCodesParams;
    use crate::service::testing::test_service;

    fn with_lines(name: &str, lines: Vec<CodeLine>) -> CreateProduct {
        CreateProduct {
            codes: lines,
            ..CreateProduct::named(name)
        }
    }

    #[test]
    fn create_and_get_with_codes() {
        let svc = test_service();
        let p = svc
            .create_product(with_lines(
                "Shoe",
                vec![
                    CodeLine::new("1234567890123", CodeType::Ean),
                    CodeLine::new("SHOE-RED", CodeType::Other),
                ],
            ))
            .unwrap();
        assert_eq!(p.codes.len(), 2);

        let fetched = svc.get_product(&p.id).unwrap();
        assert_eq!(fetched, p);
        assert_eq!(fetched.codes[0].code, "1234567890123");
        assert_eq!(fetched.codes[1].product, p.id);
    }

    #[test]
    fn invalid_code_line_aborts_product_creation() {
        let svc = test_service();
        let err = svc
            .create_product(with_lines("Shoe", vec![CodeLine::new("123", CodeType::Ean)]))
            .unwrap_err();
        assert!(matches!(err, ProductError::WrongCodeLength { .. }));

        let rows = svc.sql.query("SELECT COUNT(*) AS cnt FROM products", &[]).unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(0));
    }

    #[test]
    fn empty_name_is_rejected() {
        let svc = test_service();
        let err = svc.create_product(CreateProduct::named("  ")).unwrap_err();
        assert!(matches!(err, ProductError::Validation(_)));
    }

    #[test]
    fn update_protects_identity_and_codes() {
        let svc = test_service();
        let p = svc
            .create_product(with_lines("Shoe", vec![CodeLine::new("S1", CodeType::Other)]))
            .unwrap();

        let updated = svc
            .update_product(
                &p.id,
                serde_json::json!({
                    "id": "other",
                    "name": "Boot",
                    "code": "B-1",
                    "codes": [],
                }),
            )
            .unwrap();
        assert_eq!(updated.id, p.id);
        assert_eq!(updated.name, "Boot");
        assert_eq!(updated.code.as_deref(), Some("B-1"));
        assert_eq!(updated.created_at, p.created_at);
        assert_eq!(updated.codes.len(), 1);

        // Clearing an optional field with null.
        let cleared = svc
            .update_product(&p.id, serde_json::json!({"code": null}))
            .unwrap();
        assert_eq!(cleared.code, None);

        assert!(matches!(
            svc.update_product("missing", serde_json::json!({"name": "x"})),
            Err(ProductError::NotFound(_))
        ));
    }

    #[test]
    fn copy_yields_zero_codes() {
        let svc = test_service();
        let source = svc
            .create_product(with_lines(
                "Shoe",
                vec![
                    CodeLine::new("1234567890123", CodeType::Ean),
                    CodeLine::new("012345678905", CodeType::UpcA),
                    CodeLine::new("SHOE", CodeType::Other),
                ],
            ))
            .unwrap();

        let copies = svc
            .copy_products(&[source.id.clone()], CopyDefaults::default())
            .unwrap();
        assert_eq!(copies.len(), 1);
        let copy = svc.get_product(&copies[0].id).unwrap();
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.name, "Shoe");
        assert!(copy.codes.is_empty());
        // Source keeps its codes.
        assert_eq!(svc.get_product(&source.id).unwrap().codes.len(), 3);
    }

    #[test]
    fn copy_applies_defaults() {
        let svc = test_service();
        let a = svc.create_product(CreateProduct::named("A")).unwrap();
        let b = svc.create_product(CreateProduct::named("B")).unwrap();

        let copies = svc
            .copy_products(
                &[a.id.clone(), b.id.clone()],
                CopyDefaults {
                    active: Some(false),
                    codes: vec![CodeLine::new("DUP", CodeType::Other)],
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(copies.len(), 2);
        assert_eq!(copies[0].name, "A");
        assert_eq!(copies[1].name, "B");
        for copy in &copies {
            assert!(!copy.active);
            assert_eq!(copy.codes.len(), 1);
            assert_eq!(copy.codes[0].code, "DUP");
        }
    }

    #[test]
    fn copy_with_checked_code_defaults_conflicts_across_copies() {
        let svc = test_service();
        let a = svc.create_product(CreateProduct::named("A")).unwrap();
        let b = svc.create_product(CreateProduct::named("B")).unwrap();

        let err = svc
            .copy_products(
                &[a.id, b.id],
                CopyDefaults {
                    codes: vec![CodeLine::new("1234567890123", CodeType::Ean)],
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ProductError::DuplicateCode { .. }));

        let rows = svc.sql.query("SELECT COUNT(*) AS cnt FROM products", &[]).unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(2));
    }

    #[test]
    fn copy_of_missing_product_fails() {
        let svc = test_service();
        let err = svc
            .copy_products(&["missing".to_string()], CopyDefaults::default())
            .unwrap_err();
        assert!(matches!(err, ProductError::NotFound(_)));
    }

    #[test]
    fn delete_cascades_to_codes() {
        let svc = test_service();
        let p = svc
            .create_product(with_lines(
                "Shoe",
                vec![
                    CodeLine::new("1234567890123", CodeType::Ean),
                    CodeLine::new("SHOE", CodeType::Other),
                ],
            ))
            .unwrap();
        let keep = svc.create_product(CreateProduct::named("Other")).unwrap();
        svc.create_code(CreateProductCode::new(&keep.id, "KEEP", CodeType::Other))
            .unwrap();

        svc.delete_product(&p.id).unwrap();
        assert!(matches!(svc.get_product(&p.id), Err(ProductError::NotFound(_))));
        assert!(matches!(svc.product_codes(&p.id), Err(ProductError::NotFound(_))));

        let remaining = svc.list_codes(&ListCodesParams::default()).unwrap();
        assert_eq!(remaining.total, 1);
        assert_eq!(remaining.items[0].product, keep.id);

        // The EAN is free again after the cascade.
        svc.create_code(CreateProductCode::new(&keep.id, "1234567890123", CodeType::Ean))
            .unwrap();

        assert!(matches!(svc.delete_product(&p.id), Err(ProductError::NotFound(_))));
    }
}
