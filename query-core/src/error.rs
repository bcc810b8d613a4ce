use crate::{compiler::CompileError, interpreter::InterpreterError};
use query_ir::IrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    CompileError(#[from] CompileError),

    #[error("invalid query tree: {0}")]
    IrError(#[from] IrError),

    #[error(transparent)]
    InterpreterError(#[from] InterpreterError),
}

impl CoreError {
    pub fn is_structural(&self) -> bool {
        matches!(self, CoreError::CompileError(_) | CoreError::IrError(_))
    }
}
