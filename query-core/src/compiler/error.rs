use thiserror::Error;

/// Structural errors, detected before any evaluation and independent of
/// runtime data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("field `{field}` is not defined on `{object}`")]
    UnknownField { field: String, object: String },

    #[error("duplicate output name `{name}` in the selection on `{object}`")]
    DuplicateOutputName { name: String, object: String },

    #[error("field `{field}` on `{object}` is scalar and does not accept a nested selection")]
    NestedSelectionOnScalar { field: String, object: String },

    #[error("field `{field}` on `{object}` is object-typed and requires a nested selection")]
    MissingNestedSelection { field: String, object: String },

    #[error("selection exceeds the maximum depth of {limit}")]
    SelectionTooDeep { limit: usize },

    #[error("an operation must select at least one field")]
    EmptySelection,
}
