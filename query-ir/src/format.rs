//! Deterministic, indented rendering of query trees, used for trace logging
//! and by tests that compare trees structurally.

use crate::node::QueryNode;
use std::fmt;

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, 0)
    }
}

fn pad(f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    write!(f, "{:indent$}", "", indent = level * 2)
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &QueryNode, level: usize) -> fmt::Result {
    match node {
        QueryNode::Literal(value) => write!(f, "lit {value}"),
        QueryNode::Null => write!(f, "null"),
        QueryNode::Variable { name } => write!(f, "get {name}"),
        QueryNode::TypeCheck { expr, expected } => {
            write!(f, "is {expected} ")?;
            write_node(f, expr, level)
        }
        QueryNode::PropertyAccess { object, key } => {
            write!(f, "prop {key} of ")?;
            write_node(f, object, level)
        }
        QueryNode::Let { bindings, expr } => {
            writeln!(f, "let")?;
            for binding in bindings {
                pad(f, level + 1)?;
                write!(f, "{} = ", binding.name)?;
                write_node(f, &binding.expr, level + 1)?;
                writeln!(f)?;
            }
            pad(f, level)?;
            writeln!(f, "in")?;
            pad(f, level + 1)?;
            write_node(f, expr, level + 1)
        }
        QueryNode::Conditional {
            condition,
            then,
            r#else,
        } => {
            write!(f, "if ")?;
            write_node(f, condition, level)?;
            writeln!(f)?;
            pad(f, level)?;
            writeln!(f, "then")?;
            pad(f, level + 1)?;
            write_node(f, then, level + 1)?;
            writeln!(f)?;
            pad(f, level)?;
            writeln!(f, "else")?;
            pad(f, level + 1)?;
            write_node(f, r#else, level + 1)
        }
        QueryNode::Object { properties } => {
            write!(f, "object")?;
            for (name, value) in properties {
                writeln!(f)?;
                pad(f, level + 1)?;
                write!(f, "{name}: ")?;
                write_node(f, value, level + 1)?;
            }
            Ok(())
        }
        QueryNode::TransformList { list, item, expr } => {
            write!(f, "map {item} over ")?;
            write_node(f, list, level)?;
            writeln!(f)?;
            pad(f, level + 1)?;
            write_node(f, expr, level + 1)
        }
        QueryNode::Leaf { op, inputs } => {
            write!(f, "leaf {}", op.describe())?;
            for input in inputs {
                writeln!(f)?;
                pad(f, level + 1)?;
                write!(f, "<- ")?;
                write_node(f, input, level + 1)?;
            }
            Ok(())
        }
    }
}
