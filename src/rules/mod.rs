//! Rule kinds, adapters and the registry that connects them.

pub mod adapter;
pub mod builtin;
pub mod registry;

pub use adapter::{Adapter, AdapterTable, FieldAdapter, FnAdapter};
pub use registry::{
    ContextualFactory, PlainFactory, Registry, RuleFactory, RuleKindDescriptor, SharedRegistry,
};
