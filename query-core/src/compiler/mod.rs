//! The selection compiler: walks a requested selection against an object
//! type and produces one query tree per operation.
//!
//! Two guards are inserted mechanically. The safe-object guard binds a
//! source expression to a variable and only constructs the nested object
//! when the bound value actually is an object, degrading to null otherwise.
//! The safe-list guard does the same for list-valued fields, degrading an
//! absent or malformed list to an empty one. Together they make absence at
//! any level of the object graph a value, never a runtime type error.
//!
//! Repeated selection entries naming the same field with equal arguments
//! resolve once: the resolved fragment is hoisted into a binding on the
//! enclosing object node and every alias references the bound variable, so
//! an expensive or non-idempotent leaf runs once per request of that field.

mod error;

use crate::operation::Selection;
use query_ir::{BasicType, Binding, QueryNode};
use query_schema::ObjectType;
use query_value::QueryValue;
use std::collections::HashSet;

pub use error::CompileError;

pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Concrete selections bottom out on their own; the depth cap only turns a
/// pathological request into a structural error instead of a stack overflow.
const MAX_DEPTH: usize = 128;

/// Compiles the requested selection against a root object type into one
/// query tree. Pure and synchronous: no resolver I/O happens here.
pub fn compile(root: &ObjectType, selection: &[Selection]) -> CompileResult<QueryNode> {
    if selection.is_empty() {
        return Err(CompileError::EmptySelection);
    }

    let mut compiler = SelectionCompiler::default();
    let source = QueryNode::Literal(QueryValue::object([]));
    compiler.compile_object(source, root, selection, 0)
}

#[derive(Debug, Default)]
struct SelectionCompiler {
    counter: u32,
}

impl SelectionCompiler {
    fn fresh(&mut self, prefix: &str) -> String {
        let name = format!("{prefix}_{}", self.counter);
        self.counter += 1;
        name
    }

    /// Safe-object guard: `let v = source in if v is object then {…} else null`.
    fn compile_object(
        &mut self,
        source: QueryNode,
        ty: &ObjectType,
        selection: &[Selection],
        depth: usize,
    ) -> CompileResult<QueryNode> {
        if depth > MAX_DEPTH {
            return Err(CompileError::SelectionTooDeep { limit: MAX_DEPTH });
        }

        let var = self.fresh("object");
        let body = self.compile_properties(&QueryNode::variable(var.clone()), ty, selection, depth)?;

        Ok(QueryNode::Let {
            bindings: vec![Binding::new(var.clone(), source)],
            expr: Box::new(QueryNode::conditional(
                QueryNode::type_check(QueryNode::variable(var), BasicType::Object),
                body,
                QueryNode::Null,
            )),
        })
    }

    /// Safe-list guard: bind the raw list, normalize a non-list to `[]`, and
    /// compile the item selection under a fresh per-item variable.
    fn compile_list(
        &mut self,
        source: QueryNode,
        ty: &ObjectType,
        selection: &[Selection],
        depth: usize,
    ) -> CompileResult<QueryNode> {
        let list_var = self.fresh("list");
        let item_var = self.fresh("item");
        let inner = self.compile_object(QueryNode::variable(item_var.clone()), ty, selection, depth)?;

        Ok(QueryNode::Let {
            bindings: vec![Binding::new(list_var.clone(), source)],
            expr: Box::new(QueryNode::conditional(
                QueryNode::type_check(QueryNode::variable(list_var.clone()), BasicType::List),
                QueryNode::TransformList {
                    list: Box::new(QueryNode::variable(list_var)),
                    item: item_var.into(),
                    expr: Box::new(inner),
                },
                QueryNode::empty_list(),
            )),
        })
    }

    fn compile_properties(
        &mut self,
        source: &QueryNode,
        ty: &ObjectType,
        selection: &[Selection],
        depth: usize,
    ) -> CompileResult<QueryNode> {
        let mut bindings: Vec<Binding> = Vec::new();
        let mut shared: Vec<(&Selection, String)> = Vec::new();
        let mut properties = Vec::with_capacity(selection.len());
        let mut seen_output = HashSet::with_capacity(selection.len());

        for sel in selection {
            let output_name = sel.output_name().to_owned();
            if !seen_output.insert(output_name.clone()) {
                return Err(CompileError::DuplicateOutputName {
                    name: output_name,
                    object: ty.name().to_owned(),
                });
            }

            let field = ty
                .find_field(sel.name())
                .ok_or_else(|| CompileError::UnknownField {
                    field: sel.name().to_owned(),
                    object: ty.name().to_owned(),
                })?;

            let resolved = if is_repeated(selection, sel) {
                match shared_variable(&shared, sel) {
                    Some(var) => QueryNode::variable(var),
                    None => {
                        let var = self.fresh("shared");
                        bindings.push(Binding::new(var.clone(), field.resolve(source, sel.arguments())));
                        shared.push((sel, var.clone()));
                        QueryNode::variable(var)
                    }
                }
            } else {
                field.resolve(source, sel.arguments())
            };

            let node = match field.result_type().as_object_type() {
                Some(nested_ty) => {
                    if sel.nested_selections().is_empty() {
                        return Err(CompileError::MissingNestedSelection {
                            field: sel.name().to_owned(),
                            object: ty.name().to_owned(),
                        });
                    }

                    if field.result_type().is_list() {
                        self.compile_list(resolved, nested_ty, sel.nested_selections(), depth + 1)?
                    } else {
                        self.compile_object(resolved, nested_ty, sel.nested_selections(), depth + 1)?
                    }
                }
                None => {
                    if !sel.nested_selections().is_empty() {
                        return Err(CompileError::NestedSelectionOnScalar {
                            field: sel.name().to_owned(),
                            object: ty.name().to_owned(),
                        });
                    }

                    resolved
                }
            };

            properties.push((output_name, node));
        }

        let object = QueryNode::Object { properties };

        Ok(if bindings.is_empty() {
            object
        } else {
            QueryNode::Let {
                bindings,
                expr: Box::new(object),
            }
        })
    }
}

fn is_repeated(selection: &[Selection], sel: &Selection) -> bool {
    selection
        .iter()
        .filter(|other| other.name() == sel.name() && other.arguments() == sel.arguments())
        .count()
        > 1
}

fn shared_variable(shared: &[(&Selection, String)], sel: &Selection) -> Option<String> {
    shared
        .iter()
        .find(|(other, _)| other.name() == sel.name() && other.arguments() == sel.arguments())
        .map(|(_, var)| var.clone())
}

#[cfg(test)]
mod tests;
