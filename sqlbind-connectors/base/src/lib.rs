// Statement building and typed parameter binding for SQL connectors.
// Templates with `$name` placeholders or JSON request documents are rewritten
// into parameterised statements and bound through the driver collaborator.

pub mod binder;
pub mod interface;
pub mod memory;
pub mod orchestrator;
pub mod request;
pub mod template;
pub mod type_registry;
pub mod where_builder;

mod plan;
pub use plan::*;
