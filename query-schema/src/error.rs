use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate field `{field}` on object type `{object}`")]
    DuplicateField { object: String, field: String },

    #[error("fields of object type `{object}` were already installed")]
    FieldsAlreadySet { object: String },
}
