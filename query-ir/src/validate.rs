//! Structural validation of a compiled tree against its construction
//! invariants. Runs before evaluation, independent of runtime data.

use crate::node::QueryNode;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IrError {
    #[error("reference to unbound variable `{name}`")]
    UnboundVariable { name: String },

    #[error("variable `{name}` is already bound in an enclosing scope")]
    ShadowedBinding { name: String },

    #[error("duplicate property `{name}` in object construction")]
    DuplicateProperty { name: String },
}

/// Checks that every `Variable` references an ancestor binding, that no
/// binding shadows an in-scope name, and that `Object` property names are
/// unique per node.
pub fn validate(node: &QueryNode) -> Result<(), IrError> {
    let mut scope = HashSet::new();
    check(node, &mut scope)
}

fn check(node: &QueryNode, scope: &mut HashSet<String>) -> Result<(), IrError> {
    match node {
        QueryNode::Literal(_) | QueryNode::Null => Ok(()),

        QueryNode::Variable { name } => {
            if scope.contains(name.as_ref()) {
                Ok(())
            } else {
                Err(IrError::UnboundVariable {
                    name: name.to_string(),
                })
            }
        }

        QueryNode::Let { bindings, expr } => {
            // Binding expressions see the outer scope only, matching the
            // interpreter's evaluation order.
            for binding in bindings {
                if scope.contains(binding.name.as_ref()) {
                    return Err(IrError::ShadowedBinding {
                        name: binding.name.to_string(),
                    });
                }
                check(&binding.expr, scope)?;
            }

            let mut introduced = Vec::with_capacity(bindings.len());
            for binding in bindings {
                if !scope.insert(binding.name.to_string()) {
                    return Err(IrError::ShadowedBinding {
                        name: binding.name.to_string(),
                    });
                }
                introduced.push(binding.name.to_string());
            }

            let result = check(expr, scope);

            for name in introduced {
                scope.remove(&name);
            }

            result
        }

        QueryNode::TransformList { list, item, expr } => {
            check(list, scope)?;

            if !scope.insert(item.to_string()) {
                return Err(IrError::ShadowedBinding {
                    name: item.to_string(),
                });
            }

            let result = check(expr, scope);
            scope.remove(item.as_ref());
            result
        }

        QueryNode::Object { properties } => {
            let mut seen = HashSet::with_capacity(properties.len());
            for (name, value) in properties {
                if !seen.insert(name.as_str()) {
                    return Err(IrError::DuplicateProperty { name: name.clone() });
                }
                check(value, scope)?;
            }
            Ok(())
        }

        QueryNode::TypeCheck { expr, .. } => check(expr, scope),

        QueryNode::Conditional {
            condition,
            then,
            r#else,
        } => {
            check(condition, scope)?;
            check(then, scope)?;
            check(r#else, scope)
        }

        QueryNode::PropertyAccess { object, .. } => check(object, scope),

        QueryNode::Leaf { inputs, .. } => {
            for input in inputs {
                check(input, scope)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BasicType, Binding, QueryNode};
    use query_value::QueryValue;

    fn bound(name: &'static str, expr: QueryNode, body: QueryNode) -> QueryNode {
        QueryNode::Let {
            bindings: vec![Binding::new(name, expr)],
            expr: Box::new(body),
        }
    }

    #[test]
    fn accepts_variable_bound_by_ancestor() {
        let tree = bound(
            "v",
            QueryNode::literal(1i64),
            QueryNode::type_check(QueryNode::variable("v"), BasicType::Object),
        );

        assert_eq!(validate(&tree), Ok(()));
    }

    #[test]
    fn rejects_unbound_variable() {
        let tree = QueryNode::type_check(QueryNode::variable("missing"), BasicType::Object);

        assert_eq!(
            validate(&tree),
            Err(IrError::UnboundVariable {
                name: "missing".into()
            })
        );
    }

    #[test]
    fn binding_expressions_do_not_see_their_own_scope() {
        let tree = bound(
            "v",
            QueryNode::variable("v"),
            QueryNode::Null,
        );

        assert_eq!(
            validate(&tree),
            Err(IrError::UnboundVariable { name: "v".into() })
        );
    }

    #[test]
    fn rejects_shadowing_of_an_enclosing_binding() {
        let tree = bound(
            "v",
            QueryNode::literal(1i64),
            bound("v", QueryNode::literal(2i64), QueryNode::variable("v")),
        );

        assert_eq!(
            validate(&tree),
            Err(IrError::ShadowedBinding { name: "v".into() })
        );
    }

    #[test]
    fn item_variable_is_scoped_to_the_transform_body() {
        let transform = QueryNode::TransformList {
            list: Box::new(QueryNode::empty_list()),
            item: "item".into(),
            expr: Box::new(QueryNode::variable("item")),
        };

        // In scope inside the body.
        assert_eq!(validate(&transform), Ok(()));

        // Out of scope for siblings.
        let sibling = QueryNode::Object {
            properties: vec![
                ("xs".into(), transform),
                ("leak".into(), QueryNode::variable("item")),
            ],
        };

        assert_eq!(
            validate(&sibling),
            Err(IrError::UnboundVariable { name: "item".into() })
        );
    }

    #[test]
    fn rejects_duplicate_object_properties() {
        let tree = QueryNode::Object {
            properties: vec![
                ("a".into(), QueryNode::Null),
                ("a".into(), QueryNode::Literal(QueryValue::Int(1))),
            ],
        };

        assert_eq!(
            validate(&tree),
            Err(IrError::DuplicateProperty { name: "a".into() })
        );
    }
}
