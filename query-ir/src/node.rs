use crate::leaf::LeafOp;
use query_value::QueryValue;
use std::{borrow::Cow, fmt, sync::Arc};

/// One node of a compiled query tree.
///
/// Trees are immutable once constructed and form a DAG only through variable
/// references: a [`QueryNode::Variable`] may only reference a binding
/// introduced by an ancestor [`QueryNode::Let`] or [`QueryNode::TransformList`]
/// (enforced by [`crate::validate`]). Construction never evaluates anything.
#[derive(Debug, Clone)]
pub enum QueryNode {
    /// A constant value.
    Literal(QueryValue),

    /// The typed absence of a value, distinct from "field not requested".
    Null,

    /// Reads a variable bound by an enclosing scope.
    Variable { name: Cow<'static, str> },

    /// A lexical scope with let-bindings. Bindings are evaluated strictly
    /// before the body, each exactly once, regardless of how often their
    /// variables are referenced.
    Let {
        bindings: Vec<Binding>,
        expr: Box<QueryNode>,
    },

    /// Evaluates to `true` iff `expr` evaluates to a value of `expected`.
    TypeCheck {
        expr: Box<QueryNode>,
        expected: BasicType,
    },

    /// Evaluates `condition`, then exactly one of the two branches.
    Conditional {
        condition: Box<QueryNode>,
        then: Box<QueryNode>,
        r#else: Box<QueryNode>,
    },

    /// Constructs a keyed result. Property names are unique within one node
    /// and the output preserves the given order; property expressions have no
    /// cross-dependencies and may be evaluated concurrently.
    Object { properties: Vec<(String, QueryNode)> },

    /// Maps `expr` over the elements of `list`, binding `item` per element.
    /// The output sequence has the same length and order as the input.
    TransformList {
        list: Box<QueryNode>,
        item: Cow<'static, str>,
        expr: Box<QueryNode>,
    },

    /// Reads a property off an object value. An absent property or a
    /// non-object subject yields null, never an error.
    PropertyAccess { object: Box<QueryNode>, key: String },

    /// An opaque leaf supplied by a schema resolver. The structural `inputs`
    /// are evaluated first; the op then receives their values and may perform
    /// store I/O.
    Leaf {
        op: Arc<dyn LeafOp>,
        inputs: Vec<QueryNode>,
    },
}

impl QueryNode {
    pub fn literal(value: impl Into<QueryValue>) -> QueryNode {
        QueryNode::Literal(value.into())
    }

    pub fn variable(name: impl Into<Cow<'static, str>>) -> QueryNode {
        QueryNode::Variable { name: name.into() }
    }

    pub fn empty_list() -> QueryNode {
        QueryNode::Literal(QueryValue::List(Vec::new()))
    }

    pub fn type_check(expr: QueryNode, expected: BasicType) -> QueryNode {
        QueryNode::TypeCheck {
            expr: Box::new(expr),
            expected,
        }
    }

    pub fn conditional(condition: QueryNode, then: QueryNode, r#else: QueryNode) -> QueryNode {
        QueryNode::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            r#else: Box::new(r#else),
        }
    }

    pub fn property_access(object: QueryNode, key: impl Into<String>) -> QueryNode {
        QueryNode::PropertyAccess {
            object: Box::new(object),
            key: key.into(),
        }
    }

    pub fn leaf(op: Arc<dyn LeafOp>, inputs: Vec<QueryNode>) -> QueryNode {
        QueryNode::Leaf { op, inputs }
    }
}

/// A single `name = expr` binding inside a [`QueryNode::Let`].
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: Cow<'static, str>,
    pub expr: QueryNode,
}

impl Binding {
    pub fn new(name: impl Into<Cow<'static, str>>, expr: QueryNode) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

/// Runtime type tags used by [`QueryNode::TypeCheck`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicType {
    Null,
    Boolean,
    Int,
    Float,
    String,
    Object,
    List,
}

impl BasicType {
    pub fn of(value: &QueryValue) -> BasicType {
        match value {
            QueryValue::Null => BasicType::Null,
            QueryValue::Boolean(_) => BasicType::Boolean,
            QueryValue::Int(_) => BasicType::Int,
            QueryValue::Float(_) => BasicType::Float,
            QueryValue::String(_) => BasicType::String,
            QueryValue::List(_) => BasicType::List,
            QueryValue::Object(_) => BasicType::Object,
        }
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BasicType::Null => "null",
            BasicType::Boolean => "boolean",
            BasicType::Int => "int",
            BasicType::Float => "float",
            BasicType::String => "string",
            BasicType::Object => "object",
            BasicType::List => "list",
        };
        f.write_str(name)
    }
}
