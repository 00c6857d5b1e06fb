//! Product search: rec-name domains and their translation to SQL.

use tracing::trace;

use openerp_core::{ListParams, ListResult};
use openerp_sql::Value;

use crate::domain::{Clause, Domain, Operator};
use crate::model::Product;
use super::product::with_codes;
use super::{PRODUCTS, ProductError, ProductService, list_records};

/// Field name that stands for a record's display name in search domains.
pub const REC_NAME: &str = "rec_name";

/// Build the domain searching products by display name.
///
/// A product matches when its name, its internal reference or one of its
/// active codes satisfies the clause's comparison. Negative operators
/// require all three to hold instead.
pub fn search_rec_name(name: &str, clause: &Clause) -> Domain {
    trace!(field = name, op = %clause.operator, "rec_name search");
    let codes: Domain = clause.on("codes.code").into();
    match base_rec_name(clause) {
        Domain::And(mut items) => {
            items.push(codes);
            Domain::And(items)
        }
        Domain::Or(mut items) => {
            items.push(codes);
            Domain::Or(items)
        }
        leaf => Domain::Or(vec![leaf, codes]),
    }
}

/// Rec-name domain of a plain product, before codes are considered.
fn base_rec_name(clause: &Clause) -> Domain {
    let items: Vec<Domain> = vec![clause.on("name").into(), clause.on("code").into()];
    if clause.operator.is_negative() {
        Domain::And(items)
    } else {
        Domain::Or(items)
    }
}

/// Escape `%`, `_` and `\` so `text` matches literally inside a LIKE pattern.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl ProductService {
    /// Search products matching `domain`, with codes populated.
    pub fn search_products(
        &self,
        domain: &Domain,
        params: &ListParams,
    ) -> Result<ListResult<Product>, ProductError> {
        let mut values = Vec::new();
        let mut where_sql = compile(domain, &mut values)?;
        if let Some(active) = params.active {
            values.push(Value::from(active));
            where_sql = format!("({}) AND active = ?{}", where_sql, values.len());
        }

        let db = self.sql.as_ref();
        let (items, total) = list_records::<_, Product>(
            db,
            PRODUCTS,
            &where_sql,
            values,
            params.page_limit(),
            params.offset,
        )?;
        let items = items
            .into_iter()
            .map(|p| with_codes(db, p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListResult { items, total })
    }

    /// Search products by display name with `operator` and `value`.
    pub fn name_search(
        &self,
        operator: Operator,
        value: &str,
        params: &ListParams,
    ) -> Result<ListResult<Product>, ProductError> {
        let domain = search_rec_name(REC_NAME, &Clause::new(REC_NAME, operator, value));
        self.search_products(&domain, params)
    }

    /// List products. A free-text `q` matches anywhere in the display name,
    /// case-insensitively.
    pub fn list_products(&self, params: &ListParams) -> Result<ListResult<Product>, ProductError> {
        let domain = match params.q.as_deref().filter(|q| !q.is_empty()) {
            Some(q) => {
                let pattern = format!("%{}%", escape_like(q));
                search_rec_name(REC_NAME, &Clause::new(REC_NAME, Operator::ILike, pattern))
            }
            None => Domain::all(),
        };
        self.search_products(&domain, params)
    }
}

/// Compile a domain into a WHERE fragment, appending bound values.
pub(crate) fn compile(domain: &Domain, values: &mut Vec<Value>) -> Result<String, ProductError> {
    match domain {
        Domain::Leaf(clause) => compile_clause(clause, values),
        Domain::And(items) => join(items, " AND ", "1 = 1", values),
        Domain::Or(items) => join(items, " OR ", "1 = 0", values),
    }
}

fn join(
    items: &[Domain],
    sep: &str,
    empty: &str,
    values: &mut Vec<Value>,
) -> Result<String, ProductError> {
    if items.is_empty() {
        return Ok(empty.to_string());
    }
    let parts = items
        .iter()
        .map(|d| compile(d, values).map(|sql| format!("({})", sql)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(sep))
}

fn compile_clause(clause: &Clause, values: &mut Vec<Value>) -> Result<String, ProductError> {
    match clause.field.as_str() {
        REC_NAME => compile(&search_rec_name(REC_NAME, clause), values),
        "id" | "name" => compare("products", &clause.field, clause, values, false),
        "code" => compare("products", "code", clause, values, true),
        "active" => {
            let active = clause.value.as_bool().ok_or_else(|| {
                ProductError::Validation("active expects a boolean".into())
            })?;
            let op = match clause.operator {
                Operator::Eq => "=",
                Operator::Ne => "!=",
                other => {
                    return Err(ProductError::Validation(format!(
                        "operator '{}' not supported on active",
                        other
                    )));
                }
            };
            values.push(Value::from(active));
            Ok(format!("active {} ?{}", op, values.len()))
        }
        // A negated comparison on codes excludes every product owning a
        // matching active code.
        "codes.code" => {
            let positive = Clause {
                operator: clause.operator.positive(),
                ..clause.clone()
            };
            let cond = compare("product_codes", "code", &positive, values, false)?;
            let membership = if clause.operator.is_negative() { "NOT IN" } else { "IN" };
            Ok(format!(
                "id {} (SELECT product_id FROM product_codes WHERE active = 1 AND {})",
                membership, cond
            ))
        }
        other => Err(ProductError::Validation(format!(
            "cannot search on field '{}'",
            other
        ))),
    }
}

/// Comparison of a text column. Negative operators on a nullable column
/// also match NULL.
fn compare(
    table: &str,
    column: &str,
    clause: &Clause,
    values: &mut Vec<Value>,
    nullable: bool,
) -> Result<String, ProductError> {
    let value = clause.value.as_str().ok_or_else(|| {
        ProductError::Validation(format!("{} expects a string", clause.field))
    })?;
    values.push(Value::Text(value.to_string()));
    let idx = values.len();
    let col = format!("{}.{}", table, column);

    let sql = match clause.operator {
        Operator::Eq => format!("{} = ?{}", col, idx),
        Operator::Ne => format!("{} != ?{}", col, idx),
        Operator::Like => format!("{} LIKE ?{} ESCAPE '\\'", col, idx),
        Operator::NotLike => format!("{} NOT LIKE ?{} ESCAPE '\\'", col, idx),
        Operator::ILike => format!("LOWER({}) LIKE LOWER(?{}) ESCAPE '\\'", col, idx),
        Operator::NotILike => format!("LOWER({}) NOT LIKE LOWER(?{}) ESCAPE '\\'", col, idx),
    };

    if nullable && clause.operator.is_negative() {
        Ok(format!("({} IS NULL OR {})", col, sql))
    } else {
        Ok(sql)
    }
}
