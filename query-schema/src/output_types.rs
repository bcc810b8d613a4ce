use crate::object_type::ObjectType;
use std::sync::Arc;

/// The declared result type of a field.
#[derive(Debug, Clone)]
pub struct OutputType {
    is_list: bool,
    inner: InnerOutputType,
}

#[derive(Debug, Clone)]
pub enum InnerOutputType {
    Scalar(ScalarType),
    Object(Arc<ObjectType>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Int,
    Float,
    Boolean,
}

impl OutputType {
    pub fn non_list(inner: InnerOutputType) -> OutputType {
        OutputType { is_list: false, inner }
    }

    pub fn list(inner: InnerOutputType) -> OutputType {
        OutputType { is_list: true, inner }
    }

    pub fn object(containing: Arc<ObjectType>) -> OutputType {
        OutputType::non_list(InnerOutputType::Object(containing))
    }

    pub fn object_list(containing: Arc<ObjectType>) -> OutputType {
        OutputType::list(InnerOutputType::Object(containing))
    }

    pub fn string() -> OutputType {
        OutputType::non_list(InnerOutputType::Scalar(ScalarType::String))
    }

    pub fn int() -> OutputType {
        OutputType::non_list(InnerOutputType::Scalar(ScalarType::Int))
    }

    pub fn float() -> OutputType {
        OutputType::non_list(InnerOutputType::Scalar(ScalarType::Float))
    }

    pub fn boolean() -> OutputType {
        OutputType::non_list(InnerOutputType::Scalar(ScalarType::Boolean))
    }

    pub fn as_object_type(&self) -> Option<&Arc<ObjectType>> {
        match &self.inner {
            InnerOutputType::Object(obj) => Some(obj),
            InnerOutputType::Scalar(_) => None,
        }
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    pub fn is_object(&self) -> bool {
        matches!(self.inner, InnerOutputType::Object(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.inner, InnerOutputType::Scalar(_))
    }
}
