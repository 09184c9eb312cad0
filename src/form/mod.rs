//! Form declarations: which fields carry which rules, and in what order.

pub mod ordering;
pub mod schema;
pub mod spec;

pub use ordering::{order_fields, FieldOrdering, OrderingState};
pub use schema::{FieldSchema, FormSchema};
pub use spec::{FieldSpec, FormSpec, FormSpecBuilder};
