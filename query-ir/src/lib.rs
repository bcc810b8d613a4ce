//! The store-agnostic query-tree intermediate representation.
//!
//! A [`QueryNode`] tree is produced by the selection compiler, validated
//! against its construction invariants, and consumed exactly once by the
//! interpreter. Nodes carry no behavior beyond structure; the only holes in
//! the algebra are [`LeafOp`] implementations supplied by the schema layer,
//! which the compiler composes without interpreting.

mod context;
mod format;
mod leaf;
mod node;
mod store;
mod validate;

pub use context::ExecutionContext;
pub use leaf::{LeafError, LeafOp};
pub use node::{BasicType, Binding, QueryNode};
pub use store::{Store, StoreError};
pub use validate::{validate, IrError};
