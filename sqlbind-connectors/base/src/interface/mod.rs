mod connection;
pub use connection::*;
mod statement;
pub use statement::*;
