use sqlbind_core::err::Result;

mod conf;
pub use conf::*;
mod connection;
pub use connection::*;
mod data;
pub use data::*;
mod statement;
pub use statement::*;

/// The statement driver for Sqlite built on rusqlite
#[derive(Default)]
pub struct SqliteConnector;

impl SqliteConnector {
    pub const PRODUCT_NAME: &'static str = "SQLite";

    /// Connects an sqlite database
    pub fn connect(config: SqliteConnectionConfig) -> Result<SqliteConnection> {
        SqliteConnection::open(&config)
    }
}
