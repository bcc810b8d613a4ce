//! Built-in leaf operations composed by the field resolvers. These are the
//! only places where store I/O and role checks happen; the compiler treats
//! them as opaque.

use futures::future::BoxFuture;
use futures::FutureExt;
use query_ir::{ExecutionContext, LeafError, LeafOp};
use query_value::{ObjectValue, QueryValue};
use std::borrow::Cow;

fn first_input(inputs: Vec<QueryValue>) -> QueryValue {
    inputs.into_iter().next().unwrap_or(QueryValue::Null)
}

fn matches_filter(entry: &QueryValue, filter: &ObjectValue) -> bool {
    match entry.as_object() {
        Some(object) => filter
            .iter()
            .all(|(key, expected)| object.get(key).unwrap_or(&QueryValue::Null) == expected),
        None => false,
    }
}

async fn related(
    ctx: &ExecutionContext,
    collection: &str,
    foreign_key: &str,
    id: &QueryValue,
) -> Result<Vec<QueryValue>, LeafError> {
    if id.is_null() {
        return Ok(Vec::new());
    }

    let entries = ctx.store().list(collection).await?;
    Ok(entries
        .into_iter()
        .filter(|entry| {
            entry
                .as_object()
                .and_then(|object| object.get(foreign_key))
                .is_some_and(|key| key == id)
        })
        .collect())
}

/// All entries of a collection, optionally narrowed by property equalities.
#[derive(Debug)]
pub(crate) struct FetchCollection {
    pub collection: String,
    pub filter: Option<ObjectValue>,
}

impl LeafOp for FetchCollection {
    fn describe(&self) -> Cow<'static, str> {
        match &self.filter {
            Some(filter) => format!(
                "fetch {} where {}",
                self.collection,
                QueryValue::Object(filter.clone())
            )
            .into(),
            None => format!("fetch {}", self.collection).into(),
        }
    }

    fn apply<'a>(
        &'a self,
        _inputs: Vec<QueryValue>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<QueryValue, LeafError>> {
        async move {
            let entries = ctx.store().list(&self.collection).await?;
            let entries = match &self.filter {
                Some(filter) => entries
                    .into_iter()
                    .filter(|entry| matches_filter(entry, filter))
                    .collect(),
                None => entries,
            };
            Ok(QueryValue::List(entries))
        }
        .boxed()
    }
}

/// One entry by id; a null id short-circuits to null without touching the
/// store.
#[derive(Debug)]
pub(crate) struct LookupEntry {
    pub collection: String,
}

impl LeafOp for LookupEntry {
    fn describe(&self) -> Cow<'static, str> {
        format!("lookup {}", self.collection).into()
    }

    fn apply<'a>(
        &'a self,
        inputs: Vec<QueryValue>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<QueryValue, LeafError>> {
        async move {
            let id = first_input(inputs);
            if id.is_null() {
                return Ok(QueryValue::Null);
            }

            let entry = ctx.store().get(&self.collection, &id).await?;
            Ok(entry.unwrap_or(QueryValue::Null))
        }
        .boxed()
    }
}

/// Entries of another collection whose `foreign_key` points at the input id.
#[derive(Debug)]
pub(crate) struct RelatedEntries {
    pub collection: String,
    pub foreign_key: String,
}

impl LeafOp for RelatedEntries {
    fn describe(&self) -> Cow<'static, str> {
        format!("related {} by {}", self.collection, self.foreign_key).into()
    }

    fn apply<'a>(
        &'a self,
        inputs: Vec<QueryValue>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<QueryValue, LeafError>> {
        async move {
            let id = first_input(inputs);
            let entries = related(ctx, &self.collection, &self.foreign_key, &id).await?;
            Ok(QueryValue::List(entries))
        }
        .boxed()
    }
}

/// Sums one numeric property over a related collection in a single
/// traversal. Missing properties count as zero; non-numeric values are an
/// input error.
#[derive(Debug)]
pub(crate) struct SumRelated {
    pub collection: String,
    pub foreign_key: String,
    pub property: String,
}

impl LeafOp for SumRelated {
    fn describe(&self) -> Cow<'static, str> {
        format!("sum {}.{} by {}", self.collection, self.property, self.foreign_key).into()
    }

    fn apply<'a>(
        &'a self,
        inputs: Vec<QueryValue>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<QueryValue, LeafError>> {
        async move {
            let id = first_input(inputs);
            let entries = related(ctx, &self.collection, &self.foreign_key, &id).await?;

            let mut int_sum: i64 = 0;
            let mut float_sum: f64 = 0.0;
            let mut saw_float = false;

            for entry in &entries {
                let value = entry
                    .as_object()
                    .and_then(|object| object.get(&self.property))
                    .unwrap_or(&QueryValue::Null);

                match value {
                    QueryValue::Null => {}
                    QueryValue::Int(i) => int_sum += i,
                    QueryValue::Float(f) => {
                        saw_float = true;
                        float_sum += f;
                    }
                    other => {
                        return Err(LeafError::invalid_input(
                            self.describe(),
                            format!("`{}` is not numeric, got {}", self.property, other.type_name()),
                        ))
                    }
                }
            }

            if saw_float {
                Ok(QueryValue::Float(float_sum + int_sum as f64))
            } else {
                Ok(QueryValue::Int(int_sum))
            }
        }
        .boxed()
    }
}

/// Counts a related collection in a single traversal.
#[derive(Debug)]
pub(crate) struct CountRelated {
    pub collection: String,
    pub foreign_key: String,
}

impl LeafOp for CountRelated {
    fn describe(&self) -> Cow<'static, str> {
        format!("count {} by {}", self.collection, self.foreign_key).into()
    }

    fn apply<'a>(
        &'a self,
        inputs: Vec<QueryValue>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<QueryValue, LeafError>> {
        async move {
            let id = first_input(inputs);
            let entries = related(ctx, &self.collection, &self.foreign_key, &id).await?;
            Ok(QueryValue::Int(entries.len() as i64))
        }
        .boxed()
    }
}

#[derive(Debug)]
pub(crate) struct InsertEntry {
    pub collection: String,
}

impl LeafOp for InsertEntry {
    fn describe(&self) -> Cow<'static, str> {
        format!("insert into {}", self.collection).into()
    }

    fn apply<'a>(
        &'a self,
        inputs: Vec<QueryValue>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<QueryValue, LeafError>> {
        async move {
            let data = first_input(inputs);
            if !data.is_object() {
                return Err(LeafError::invalid_input(
                    self.describe(),
                    format!("`data` must be an object, got {}", data.type_name()),
                ));
            }

            Ok(ctx.store().insert(&self.collection, data).await?)
        }
        .boxed()
    }
}

/// Merges the `data` input into the entry named by the `id` input; resolves
/// to null if no such entry exists.
#[derive(Debug)]
pub(crate) struct UpdateEntry {
    pub collection: String,
}

impl LeafOp for UpdateEntry {
    fn describe(&self) -> Cow<'static, str> {
        format!("update {}", self.collection).into()
    }

    fn apply<'a>(
        &'a self,
        inputs: Vec<QueryValue>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<QueryValue, LeafError>> {
        async move {
            let mut inputs = inputs.into_iter();
            let id = inputs.next().unwrap_or(QueryValue::Null);
            let changes = inputs.next().unwrap_or(QueryValue::Null);

            if id.is_null() {
                return Ok(QueryValue::Null);
            }
            if !changes.is_object() {
                return Err(LeafError::invalid_input(
                    self.describe(),
                    format!("`data` must be an object, got {}", changes.type_name()),
                ));
            }

            let updated = ctx.store().update(&self.collection, &id, changes).await?;
            Ok(updated.unwrap_or(QueryValue::Null))
        }
        .boxed()
    }
}

/// Deletes by id; resolves to the removed entry, or null if none existed.
#[derive(Debug)]
pub(crate) struct DeleteEntry {
    pub collection: String,
}

impl LeafOp for DeleteEntry {
    fn describe(&self) -> Cow<'static, str> {
        format!("delete from {}", self.collection).into()
    }

    fn apply<'a>(
        &'a self,
        inputs: Vec<QueryValue>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<QueryValue, LeafError>> {
        async move {
            let id = first_input(inputs);
            if id.is_null() {
                return Ok(QueryValue::Null);
            }

            let removed = ctx.store().delete(&self.collection, &id).await?;
            Ok(removed.unwrap_or(QueryValue::Null))
        }
        .boxed()
    }
}

/// Evaluates to whether the request holds a role.
#[derive(Debug)]
pub(crate) struct RoleHeld {
    pub role: String,
}

impl LeafOp for RoleHeld {
    fn describe(&self) -> Cow<'static, str> {
        format!("role? {}", self.role).into()
    }

    fn apply<'a>(
        &'a self,
        _inputs: Vec<QueryValue>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<QueryValue, LeafError>> {
        async move { Ok(QueryValue::Boolean(ctx.has_role(&self.role))) }.boxed()
    }
}

/// Like [`RoleHeld`], but a missing role is an error instead of `false`.
#[derive(Debug)]
pub(crate) struct RequireRole {
    pub role: String,
    pub field: String,
}

impl LeafOp for RequireRole {
    fn describe(&self) -> Cow<'static, str> {
        format!("require {}", self.role).into()
    }

    fn apply<'a>(
        &'a self,
        _inputs: Vec<QueryValue>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<QueryValue, LeafError>> {
        async move {
            if ctx.has_role(&self.role) {
                Ok(QueryValue::Boolean(true))
            } else {
                Err(LeafError::AccessDenied {
                    field: self.field.clone(),
                })
            }
        }
        .boxed()
    }
}
