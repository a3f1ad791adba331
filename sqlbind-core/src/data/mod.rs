mod column_type;
mod dialect;
mod object;
mod sql_type;

pub use column_type::*;
pub use dialect::*;
pub use object::*;
pub use sql_type::*;

pub use bigdecimal;
pub use chrono;
