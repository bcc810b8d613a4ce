use crate::{context::ExecutionContext, store::StoreError};
use futures::future::BoxFuture;
use query_value::QueryValue;
use std::{borrow::Cow, fmt};
use thiserror::Error;

/// An opaque leaf operation composed into a query tree by a schema resolver.
///
/// The compiler does not interpret leaves; the interpreter evaluates their
/// structural inputs first and then applies the op, which is the only place
/// in a tree where store I/O happens. Ops may suspend.
pub trait LeafOp: fmt::Debug + Send + Sync {
    /// A stable, human-readable identity used by tree formatting. Two ops
    /// constructed from the same schema definition must describe identically.
    fn describe(&self) -> Cow<'static, str>;

    /// Applies the operation to the already-evaluated input values.
    fn apply<'a>(
        &'a self,
        inputs: Vec<QueryValue>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<QueryValue, LeafError>>;
}

/// Errors raised by leaf evaluation. Any of these aborts the whole operation;
/// expected absence is represented as a null or empty-list value instead.
#[derive(Debug, Error)]
pub enum LeafError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("access denied for field `{field}`")]
    AccessDenied { field: String },

    #[error("invalid input to `{op}`: {reason}")]
    InvalidInput { op: String, reason: String },
}

impl LeafError {
    pub fn invalid_input(op: impl Into<String>, reason: impl Into<String>) -> Self {
        LeafError::InvalidInput {
            op: op.into(),
            reason: reason.into(),
        }
    }
}
