//! The schema contract consumed by the query-tree compiler: object types
//! with ordered, uniquely named fields, where each field declares a result
//! type and a `resolve(source, args)` capability producing a query-tree
//! fragment.
//!
//! Resolvers are pure tree constructors. Store access and permission checks
//! are encoded as opaque leaf operations inside the returned fragments and
//! only run during evaluation.

mod error;
mod field;
mod object_type;
mod ops;
mod output_types;
mod query_schema;

pub use error::SchemaError;
pub use field::{AccessRule, AggregateOp, Argument, Field, FieldResolver, Resolve};
pub use object_type::ObjectType;
pub use output_types::{InnerOutputType, OutputType, ScalarType};
pub use query_schema::{QuerySchema, QuerySchemaRef};
