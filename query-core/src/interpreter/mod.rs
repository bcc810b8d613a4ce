//! The tree interpreter. Evaluation is pure tree-walking; the only I/O is
//! inside opaque leaves, and the only state is the variable environment.

mod env;
mod error;


use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use query_ir::{BasicType, ExecutionContext, QueryNode};
use query_value::{ObjectValue, QueryValue};
use std::sync::atomic::{AtomicU64, Ordering};

pub use env::Env;
pub use error::InterpreterError;

pub type InterpretationResult<T> = std::result::Result<T, InterpreterError>;

/// Evaluates one compiled query tree against one execution context.
///
/// Sibling object properties and list elements evaluate concurrently; let
/// bindings evaluate strictly, in order, before their body. Any error
/// anywhere in the tree fails the whole evaluation.
#[derive(Debug)]
pub struct QueryInterpreter<'ctx> {
    ctx: &'ctx ExecutionContext,
    leaf_evaluations: AtomicU64,
    bindings_evaluated: AtomicU64,
}

impl<'ctx> QueryInterpreter<'ctx> {
    pub fn new(ctx: &'ctx ExecutionContext) -> Self {
        Self {
            ctx,
            leaf_evaluations: AtomicU64::new(0),
            bindings_evaluated: AtomicU64::new(0),
        }
    }

    /// Leaf applications performed so far. With the compiler's sharing of
    /// repeated selections, this is also the number of distinct resolver
    /// evaluations the operation paid for.
    pub fn leaf_evaluations(&self) -> u64 {
        self.leaf_evaluations.load(Ordering::Relaxed)
    }

    pub fn bindings_evaluated(&self) -> u64 {
        self.bindings_evaluated.load(Ordering::Relaxed)
    }

    pub fn interpret<'a>(
        &'a self,
        node: &'a QueryNode,
        env: Env,
        level: usize,
    ) -> BoxFuture<'a, InterpretationResult<QueryValue>> {
        match node {
            QueryNode::Literal(value) => {
                self.log_line(level, || format!("LITERAL {value}"));
                async move { Ok(value.clone()) }.boxed()
            }

            QueryNode::Null => {
                self.log_line(level, || "NULL".to_owned());
                async move { Ok(QueryValue::Null) }.boxed()
            }

            QueryNode::Variable { name } => {
                self.log_line(level, || format!("GET {name}"));
                async move { env.get(name).cloned() }.boxed()
            }

            QueryNode::Let { bindings, expr } => {
                self.log_line(level, || format!("LET ({} bindings)", bindings.len()));
                async move {
                    let mut inner_env = env.clone();

                    for binding in bindings {
                        let value = self.interpret(&binding.expr, inner_env.clone(), level + 1).await?;
                        self.bindings_evaluated.fetch_add(1, Ordering::Relaxed);
                        inner_env.insert(binding.name.to_string(), value);
                    }

                    self.interpret(expr, inner_env, level + 1).await
                }
                .boxed()
            }

            QueryNode::TypeCheck { expr, expected } => {
                self.log_line(level, || format!("IS {expected}"));
                async move {
                    let value = self.interpret(expr, env, level + 1).await?;
                    Ok(QueryValue::Boolean(BasicType::of(&value) == *expected))
                }
                .boxed()
            }

            QueryNode::Conditional {
                condition,
                then,
                r#else,
            } => {
                self.log_line(level, || "IF".to_owned());
                async move {
                    let value = self.interpret(condition, env.clone(), level + 1).await?;

                    match value {
                        QueryValue::Boolean(true) => self.interpret(then, env, level + 1).await,
                        QueryValue::Boolean(false) => self.interpret(r#else, env, level + 1).await,
                        other => Err(InterpreterError::NonBooleanCondition(BasicType::of(&other))),
                    }
                }
                .boxed()
            }

            QueryNode::Object { properties } => {
                self.log_line(level, || format!("OBJECT ({} properties)", properties.len()));
                async move {
                    let futures = properties.iter().map(|(name, expr)| {
                        let env = env.clone();
                        async move {
                            let value = self.interpret(expr, env, level + 1).await?;
                            Ok::<_, InterpreterError>((name.clone(), value))
                        }
                    });

                    let object: ObjectValue = try_join_all(futures).await?.into_iter().collect();
                    Ok(QueryValue::Object(object))
                }
                .boxed()
            }

            QueryNode::TransformList { list, item, expr } => {
                self.log_line(level, || format!("MAP {item}"));
                async move {
                    let value = self.interpret(list, env.clone(), level + 1).await?;

                    let elements = match value {
                        QueryValue::List(elements) => elements,
                        other => return Err(InterpreterError::NotAList(BasicType::of(&other))),
                    };

                    let futures = elements.into_iter().map(|element| {
                        let item_env = env.bound(item.to_string(), element);
                        self.interpret(expr, item_env, level + 1)
                    });

                    Ok(QueryValue::List(try_join_all(futures).await?))
                }
                .boxed()
            }

            QueryNode::PropertyAccess { object, key } => {
                self.log_line(level, || format!("PROP {key}"));
                async move {
                    let value = self.interpret(object, env, level + 1).await?;

                    Ok(match value {
                        QueryValue::Object(map) => map.get(key).cloned().unwrap_or(QueryValue::Null),
                        _ => QueryValue::Null,
                    })
                }
                .boxed()
            }

            QueryNode::Leaf { op, inputs } => {
                self.log_line(level, || format!("LEAF {}", op.describe()));
                async move {
                    if self.ctx.is_cancelled() {
                        return Err(InterpreterError::Cancelled);
                    }

                    let input_futures = inputs
                        .iter()
                        .map(|input| self.interpret(input, env.clone(), level + 1));
                    let values = try_join_all(input_futures).await?;

                    if self.ctx.is_cancelled() {
                        return Err(InterpreterError::Cancelled);
                    }

                    self.leaf_evaluations.fetch_add(1, Ordering::Relaxed);
                    Ok(op.apply(values, self.ctx).await?)
                }
                .boxed()
            }
        }
    }

    fn log_line<F>(&self, level: usize, contents: F)
    where
        F: FnOnce() -> String,
    {
        tracing::trace!("{:indent$}{}", "", contents(), indent = level * 2);
    }
}
