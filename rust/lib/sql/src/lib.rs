pub mod error;
pub mod sqlite;
pub mod table;
pub mod traits;

pub use error::SQLError;
pub use sqlite::SqliteStore;
pub use table::TableHandler;
pub use traits::{Row, SQLExec, SQLStore, SQLTransaction, Value};
