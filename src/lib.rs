/*!

  `xir` is an in-memory, strongly typed, SSA-form program representation
  for a GPU shading/compute language, together with the traversal,
  transformation, and analysis machinery of an optimizing compiler
  middle end.

  The IR is structured: every branching instruction names all of its
  target blocks explicitly, and most also name a merge block where
  control resumes. Values, uses, instructions, blocks, and functions
  all live in a `Pool` arena and are addressed by `Copy` index
  handles, so the def-use graph is cyclic without any reference
  counting.

  Frontends construct IR through the `Builder` or the statement
  translator in `translate::ast2xir`; backends consume it through the
  traversal accessors and pattern matching on the instruction taxonomy.

*/

pub mod core;
pub mod passes;
pub mod translate;

pub use crate::core::builder::Builder;
pub use crate::core::module::Module;
pub use crate::core::pool::{MetadataRef, Pool, UseRef, ValueRef};
pub use crate::core::types::{Type, TypeTag};
