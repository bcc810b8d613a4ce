use crate::{ops, output_types::OutputType};
use query_ir::QueryNode;
use query_value::QueryValue;
use std::{fmt, sync::Arc};

/// One named argument of a selection entry.
pub type Argument = (String, QueryValue);

pub(crate) fn argument<'a>(args: &'a [Argument], name: &str) -> Option<&'a QueryValue> {
    args.iter().find(|(key, _)| key == name).map(|(_, value)| value)
}

/// A field of an [`crate::ObjectType`]: a declared result type plus the
/// capability to resolve the field into a query-tree fragment.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    result_type: OutputType,
    resolver: FieldResolver,
    access: Option<AccessRule>,
}

impl Field {
    pub fn new(name: impl Into<String>, result_type: OutputType, resolver: FieldResolver) -> Field {
        Field {
            name: name.into(),
            result_type,
            resolver,
            access: None,
        }
    }

    pub fn with_access(mut self, rule: AccessRule) -> Field {
        self.access = Some(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn result_type(&self) -> &OutputType {
        &self.result_type
    }

    /// Produces the query-tree fragment for this field's raw value. Pure with
    /// respect to tree construction; any access rule is baked into the
    /// returned fragment as a conditional around the value.
    pub fn resolve(&self, source: &QueryNode, args: &[Argument]) -> QueryNode {
        let value = self.resolver.resolve(source, args);

        match &self.access {
            None => value,
            // Null unless authorized.
            Some(AccessRule::Filter { role }) => QueryNode::conditional(
                QueryNode::leaf(Arc::new(ops::RoleHeld { role: role.clone() }), Vec::new()),
                value,
                QueryNode::Null,
            ),
            // Fail the operation unless authorized.
            Some(AccessRule::Deny { role }) => QueryNode::conditional(
                QueryNode::leaf(
                    Arc::new(ops::RequireRole {
                        role: role.clone(),
                        field: self.name.clone(),
                    }),
                    Vec::new(),
                ),
                value,
                QueryNode::Null,
            ),
        }
    }
}

/// Per-field authorization, baked into the resolved fragment.
#[derive(Debug, Clone)]
pub enum AccessRule {
    /// Unauthorized access degrades the field to null.
    Filter { role: String },

    /// Unauthorized access fails the whole operation with an access-denied
    /// error.
    Deny { role: String },
}

/// The closed set of field resolution strategies. Resolvers never introduce
/// variable names; sharing and guarding through bindings is the compiler's
/// prerogative, which keeps the no-shadowing invariant structural.
#[derive(Debug, Clone)]
pub enum FieldResolver {
    /// Reads a stored property off the source object.
    Property { key: String },

    /// A constant value, independent of the source.
    Constant { value: QueryValue },

    /// All entries of a collection, optionally narrowed by an `filter`
    /// argument of property equalities.
    Collection { collection: String },

    /// One entry of a collection, looked up by the `id` argument.
    Entry { collection: String },

    /// Follows a stored foreign id on the source to an entry of another
    /// collection.
    Reference { collection: String, key: String },

    /// The entries of another collection whose `foreign_key` property points
    /// back at the source.
    Related { collection: String, foreign_key: String },

    /// An aggregate over a related collection, pushed into a single leaf so
    /// the traversal happens once per evaluation.
    Aggregate {
        collection: String,
        foreign_key: String,
        op: AggregateOp,
    },

    /// Inserts the `data` argument as a new entry.
    Create { collection: String },

    /// Merges the `data` argument into the entry named by the `id` argument.
    Update { collection: String },

    /// Deletes the entry named by the `id` argument.
    Delete { collection: String },

    /// Schema-assembly extension point.
    Custom(Arc<dyn Resolve>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateOp {
    Count,
    Sum { property: String },
}

impl FieldResolver {
    fn resolve(&self, source: &QueryNode, args: &[Argument]) -> QueryNode {
        match self {
            FieldResolver::Property { key } => QueryNode::property_access(source.clone(), key.clone()),

            FieldResolver::Constant { value } => QueryNode::Literal(value.clone()),

            FieldResolver::Collection { collection } => QueryNode::leaf(
                Arc::new(ops::FetchCollection {
                    collection: collection.clone(),
                    filter: argument(args, "filter").and_then(QueryValue::as_object).cloned(),
                }),
                Vec::new(),
            ),

            FieldResolver::Entry { collection } => QueryNode::leaf(
                Arc::new(ops::LookupEntry {
                    collection: collection.clone(),
                }),
                vec![QueryNode::Literal(
                    argument(args, "id").cloned().unwrap_or(QueryValue::Null),
                )],
            ),

            FieldResolver::Reference { collection, key } => QueryNode::leaf(
                Arc::new(ops::LookupEntry {
                    collection: collection.clone(),
                }),
                vec![QueryNode::property_access(source.clone(), key.clone())],
            ),

            FieldResolver::Related {
                collection,
                foreign_key,
            } => QueryNode::leaf(
                Arc::new(ops::RelatedEntries {
                    collection: collection.clone(),
                    foreign_key: foreign_key.clone(),
                }),
                vec![QueryNode::property_access(source.clone(), "id")],
            ),

            FieldResolver::Aggregate {
                collection,
                foreign_key,
                op,
            } => QueryNode::leaf(
                match op {
                    AggregateOp::Count => Arc::new(ops::CountRelated {
                        collection: collection.clone(),
                        foreign_key: foreign_key.clone(),
                    }) as Arc<dyn query_ir::LeafOp>,
                    AggregateOp::Sum { property } => Arc::new(ops::SumRelated {
                        collection: collection.clone(),
                        foreign_key: foreign_key.clone(),
                        property: property.clone(),
                    }),
                },
                vec![QueryNode::property_access(source.clone(), "id")],
            ),

            FieldResolver::Create { collection } => QueryNode::leaf(
                Arc::new(ops::InsertEntry {
                    collection: collection.clone(),
                }),
                vec![QueryNode::Literal(
                    argument(args, "data").cloned().unwrap_or(QueryValue::Null),
                )],
            ),

            FieldResolver::Update { collection } => QueryNode::leaf(
                Arc::new(ops::UpdateEntry {
                    collection: collection.clone(),
                }),
                vec![
                    QueryNode::Literal(argument(args, "id").cloned().unwrap_or(QueryValue::Null)),
                    QueryNode::Literal(argument(args, "data").cloned().unwrap_or(QueryValue::Null)),
                ],
            ),

            FieldResolver::Delete { collection } => QueryNode::leaf(
                Arc::new(ops::DeleteEntry {
                    collection: collection.clone(),
                }),
                vec![QueryNode::Literal(
                    argument(args, "id").cloned().unwrap_or(QueryValue::Null),
                )],
            ),

            FieldResolver::Custom(resolve) => resolve.resolve(source, args),
        }
    }
}

/// Custom resolution strategies; used by schema assembly for computed fields
/// the built-in variants do not cover, and by tests for instrumented doubles.
pub trait Resolve: fmt::Debug + Send + Sync {
    fn resolve(&self, source: &QueryNode, args: &[Argument]) -> QueryNode;
}
