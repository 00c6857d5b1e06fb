//! Table handler: schema inspection and migration helpers.
//!
//! Module schema hooks use this to evolve tables that already exist on
//! disk, e.g. dropping a constraint that has been replaced by an
//! application-level check.

use tracing::info;

use crate::error::SQLError;
use crate::traits::{SQLExec, Value};

/// Schema helper bound to one table.
///
/// Named constraints follow the `{table}_{name}` convention: a constraint
/// declared as `code_uniq` on table `product_codes` lives in the database as
/// the unique index `product_codes_code_uniq`.
pub struct TableHandler<'a, E: SQLExec + ?Sized> {
    db: &'a E,
    table: String,
}

impl<'a, E: SQLExec + ?Sized> TableHandler<'a, E> {
    pub fn new(db: &'a E, table: &str) -> Self {
        Self {
            db,
            table: table.to_string(),
        }
    }

    /// Database name of a named constraint on this table.
    pub fn constraint_name(&self, name: &str) -> String {
        format!("{}_{}", self.table, name)
    }

    pub fn table_exists(&self) -> Result<bool, SQLError> {
        self.schema_object_exists("table", &self.table)
    }

    pub fn column_exists(&self, column: &str) -> Result<bool, SQLError> {
        let rows = self.db.query(
            "SELECT name FROM pragma_table_info(?1) WHERE name = ?2",
            &[Value::Text(self.table.clone()), Value::Text(column.to_string())],
        )?;
        Ok(!rows.is_empty())
    }

    pub fn index_exists(&self, index: &str) -> Result<bool, SQLError> {
        self.schema_object_exists("index", index)
    }

    /// Whether the named constraint is present on this table.
    pub fn constraint_exists(&self, name: &str) -> Result<bool, SQLError> {
        self.index_exists(&self.constraint_name(name))
    }

    /// Add a named UNIQUE constraint over `columns`.
    pub fn add_constraint(&self, name: &str, columns: &[&str]) -> Result<(), SQLError> {
        let sql = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
            self.constraint_name(name),
            self.table,
            columns.join(", "),
        );
        self.db.exec(&sql, &[])?;
        Ok(())
    }

    /// Drop a named constraint. Returns whether anything was dropped;
    /// dropping a constraint that is not there is a no-op.
    pub fn drop_constraint(&self, name: &str) -> Result<bool, SQLError> {
        let index = self.constraint_name(name);
        if !self.index_exists(&index)? {
            return Ok(false);
        }
        self.db.exec(&format!("DROP INDEX {}", index), &[])?;
        info!(table = %self.table, constraint = name, "dropped constraint");
        Ok(true)
    }

    fn schema_object_exists(&self, kind: &str, name: &str) -> Result<bool, SQLError> {
        let rows = self.db.query(
            "SELECT name FROM sqlite_master WHERE type = ?1 AND name = ?2",
            &[Value::Text(kind.to_string()), Value::Text(name.to_string())],
        )?;
        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteStore;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .exec("CREATE TABLE widgets (id TEXT PRIMARY KEY, label TEXT)", &[])
            .unwrap();
        store
    }

    #[test]
    fn inspects_tables_and_columns() {
        let store = store();
        let table = TableHandler::new(&store, "widgets");
        assert!(table.table_exists().unwrap());
        assert!(table.column_exists("label").unwrap());
        assert!(!table.column_exists("missing").unwrap());
        assert!(!TableHandler::new(&store, "ghosts").table_exists().unwrap());
    }

    #[test]
    fn add_and_drop_constraint() {
        let store = store();
        let table = TableHandler::new(&store, "widgets");
        table.add_constraint("label_uniq", &["label"]).unwrap();
        assert!(table.constraint_exists("label_uniq").unwrap());
        assert!(table.index_exists("widgets_label_uniq").unwrap());

        store.exec("INSERT INTO widgets (id, label) VALUES ('1', 'x')", &[]).unwrap();
        assert!(store.exec("INSERT INTO widgets (id, label) VALUES ('2', 'x')", &[]).is_err());

        assert!(table.drop_constraint("label_uniq").unwrap());
        assert!(!table.constraint_exists("label_uniq").unwrap());
        store.exec("INSERT INTO widgets (id, label) VALUES ('2', 'x')", &[]).unwrap();
    }

    #[test]
    fn drop_missing_constraint_is_noop() {
        let store = store();
        let table = TableHandler::new(&store, "widgets");
        assert!(!table.drop_constraint("nothing_here").unwrap());
    }
}
