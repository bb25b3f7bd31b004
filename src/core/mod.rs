//! The IR object model: arena, value graph, instruction taxonomy,
//! containers, and the builder.

pub mod block;
pub mod builder;
pub mod cfg;
pub mod constant;
pub mod function;
pub mod instruction;
pub mod metadata;
pub mod module;
pub mod ops;
pub mod pool;
pub mod types;
pub mod value;
pub mod verify;

pub use block::*;
pub use builder::Builder;
pub use cfg::BlockTraversalOrder;
pub use function::{ArgumentTag, FunctionTag, DEFAULT_BLOCK_SIZE};
pub use instruction::Op;
pub use metadata::{MetadataKind, MetadataTag};
pub use module::Module;
pub use ops::*;
pub use pool::{MetadataRef, Pool, UseRef, ValueRef};
pub use types::{Type, TypeTag};
pub use value::{ValueKind, ValueTag};
pub use verify::{verify_function, verify_module};
