use crate::object_type::ObjectType;
use std::sync::Arc;

/// The two root types of one deployment. Explicitly constructed by schema
/// assembly and passed to the driver; there is no ambient registry.
#[derive(Debug)]
pub struct QuerySchema {
    query: Arc<ObjectType>,
    mutation: Arc<ObjectType>,
}

impl QuerySchema {
    pub fn new(query: Arc<ObjectType>, mutation: Arc<ObjectType>) -> QuerySchema {
        QuerySchema { query, mutation }
    }

    pub fn query(&self) -> &Arc<ObjectType> {
        &self.query
    }

    pub fn mutation(&self) -> &Arc<ObjectType> {
        &self.mutation
    }
}

pub type QuerySchemaRef = Arc<QuerySchema>;
