use query_ir::{BasicType, LeafError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error("variable `{0}` is not bound in this scope")]
    UnboundVariable(String),

    #[error("conditional evaluated to a {0}, expected a boolean")]
    NonBooleanCondition(BasicType),

    #[error("list transform applied to a {0}, expected a list")]
    NotAList(BasicType),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Leaf(#[from] LeafError),
}
