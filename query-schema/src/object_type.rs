use crate::{error::SchemaError, field::Field};
use once_cell::sync::OnceCell;
use std::{collections::HashSet, sync::Arc};

/// An object type of the schema: a name plus an ordered set of uniquely
/// named fields.
///
/// Fields are installed exactly once after construction, which allows
/// mutually-referential types to be assembled without a registry: create the
/// `Arc`s first, then wire the field lists.
#[derive(Debug)]
pub struct ObjectType {
    name: String,
    fields: OnceCell<Vec<Field>>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Arc<ObjectType> {
        Arc::new(ObjectType {
            name: name.into(),
            fields: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installs the field list. Single writer: a second call fails with
    /// [`SchemaError::FieldsAlreadySet`].
    pub fn set_fields(&self, fields: Vec<Field>) -> Result<(), SchemaError> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name().to_owned()) {
                return Err(SchemaError::DuplicateField {
                    object: self.name.clone(),
                    field: field.name().to_owned(),
                });
            }
        }

        self.fields.set(fields).map_err(|_| SchemaError::FieldsAlreadySet {
            object: self.name.clone(),
        })
    }

    /// The ordered field list; empty until [`set_fields`](Self::set_fields)
    /// has run.
    pub fn fields(&self) -> &[Field] {
        self.fields.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|field| field.name() == name)
    }
}
