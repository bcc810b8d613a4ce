//! The executor ties the pipeline together: root selection, compilation,
//! tree validation, interpretation, and optional profiling.

mod profile;

use crate::{
    compiler,
    interpreter::{Env, QueryInterpreter},
    operation::Operation,
    CoreResult,
};
use query_ir::ExecutionContext;
use query_schema::QuerySchemaRef;
use query_value::QueryValue;
use std::{sync::Arc, time::Instant};

pub use profile::{EvaluationProfile, ProfileSink};

/// Executes operations against one schema. Cheap to clone and share; all
/// per-operation state lives in the [`ExecutionContext`] and the interpreter.
#[derive(Clone)]
pub struct QueryExecutor {
    schema: QuerySchemaRef,
    profile_sink: Option<Arc<dyn ProfileSink>>,
}

impl QueryExecutor {
    pub fn new(schema: QuerySchemaRef) -> Self {
        Self {
            schema,
            profile_sink: None,
        }
    }

    pub fn with_profile_sink(mut self, sink: Arc<dyn ProfileSink>) -> Self {
        self.profile_sink = Some(sink);
        self
    }

    pub fn schema(&self) -> &QuerySchemaRef {
        &self.schema
    }

    /// Runs one operation start to finish. Reads compile against the query
    /// root, writes against the mutation root; either way the result is one
    /// value or one error, never a partial response.
    pub async fn execute(
        &self,
        operation: &Operation,
        ctx: &ExecutionContext,
    ) -> CoreResult<QueryValue> {
        let root = if operation.is_write() {
            self.schema.mutation()
        } else {
            self.schema.query()
        };

        let tree = compiler::compile(root, operation.selections())?;
        query_ir::validate(&tree)?;

        tracing::debug!(root = root.name(), "compiled query tree:\n{tree}");

        let started = Instant::now();
        let interpreter = QueryInterpreter::new(ctx);
        let result = interpreter.interpret(&tree, Env::default(), 0).await?;

        if let Some(sink) = &self.profile_sink {
            sink.record(EvaluationProfile {
                leaf_evaluations: interpreter.leaf_evaluations(),
                bindings_evaluated: interpreter.bindings_evaluated(),
                elapsed: started.elapsed(),
            });
        }

        Ok(result)
    }
}
