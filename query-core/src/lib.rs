//! The query-tree core: compiles a requested field selection against a
//! schema into a store-agnostic query tree, and evaluates that tree against
//! a backing store.
//!
//! The pipeline for one operation is: [`executor::QueryExecutor`] picks the
//! root type, [`compiler::compile`] produces a [`query_ir::QueryNode`] tree
//! with null-safety and list-safety guards baked in, `query_ir::validate`
//! checks the construction invariants, and [`interpreter::QueryInterpreter`]
//! evaluates the tree. One operation yields one value or one error, never a
//! partial result.

pub mod compiler;
pub mod executor;
pub mod interpreter;
pub mod operation;

mod error;

pub use compiler::CompileError;
pub use error::CoreError;
pub use executor::{EvaluationProfile, ProfileSink, QueryExecutor};
pub use interpreter::{Env, InterpreterError, QueryInterpreter};
pub use operation::{Operation, Selection};

pub type CoreResult<T> = std::result::Result<T, CoreError>;
