//! Table command and query handlers.

mod create_table;
mod get_table;
mod update_table;

pub use create_table::{CreateTableCommand, CreateTableHandler};
pub use get_table::{GetTableHandler, GetTableQuery, ListTablesHandler, ListTablesQuery};
pub use update_table::{UpdateTableCommand, UpdateTableHandler};
