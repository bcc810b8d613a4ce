//! An in-memory [`Store`] implementation. Collections are plain vectors
//! behind one `RwLock`; ids are assigned from a monotonic counter. Intended
//! for tests and demos, not for durability.

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use query_ir::{Store, StoreError};
use query_value::{ObjectValue, QueryValue};
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<IndexMap<String, Vec<QueryValue>>>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    /// Creates a store with the given empty collections. Operations on a
    /// collection not declared here fail with
    /// [`StoreError::UnknownCollection`].
    pub fn new<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let collections = collections
            .into_iter()
            .map(|name| (name.into(), Vec::new()))
            .collect();

        Self {
            collections: RwLock::new(collections),
            next_id: AtomicI64::new(1),
        }
    }

    /// Bulk-loads entries into a collection. Seeded ids are kept as given;
    /// the id counter is bumped past the largest integer id seen so that
    /// later inserts do not collide.
    pub fn seed<I>(&self, collection: &str, entries: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = QueryValue>,
    {
        let mut collections = self.collections.write();
        let slot = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_owned()))?;

        for entry in entries {
            if let Some(QueryValue::Int(id)) = entry_id(&entry) {
                let id = *id;
                self.next_id.fetch_max(id + 1, Ordering::Relaxed);
            }
            slot.push(entry);
        }

        Ok(())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list(&self, collection: &str) -> Result<Vec<QueryValue>, StoreError> {
        let collections = self.collections.read();
        collections
            .get(collection)
            .cloned()
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_owned()))
    }

    async fn get(&self, collection: &str, id: &QueryValue) -> Result<Option<QueryValue>, StoreError> {
        let collections = self.collections.read();
        let entries = collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_owned()))?;

        Ok(entries.iter().find(|entry| entry_id(entry) == Some(id)).cloned())
    }

    async fn insert(&self, collection: &str, entry: QueryValue) -> Result<QueryValue, StoreError> {
        let mut object = match entry {
            QueryValue::Object(object) => object,
            other => {
                return Err(StoreError::ConstraintViolation(format!(
                    "cannot insert a {} entry, expected an object",
                    other.type_name()
                )))
            }
        };

        let mut collections = self.collections.write();
        let entries = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_owned()))?;

        if !object.contains_key("id") {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            object.shift_insert(0, "id".to_owned(), QueryValue::Int(id));
        }

        let id = object.get("id").cloned();
        if entries
            .iter()
            .any(|existing| entry_id(existing) == id.as_ref())
        {
            return Err(StoreError::ConstraintViolation(format!(
                "duplicate id in `{collection}`"
            )));
        }

        let stored = QueryValue::Object(object);
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        collection: &str,
        id: &QueryValue,
        changes: QueryValue,
    ) -> Result<Option<QueryValue>, StoreError> {
        let changes = match changes {
            QueryValue::Object(object) => object,
            other => {
                return Err(StoreError::ConstraintViolation(format!(
                    "cannot apply a {} as changes, expected an object",
                    other.type_name()
                )))
            }
        };

        let mut collections = self.collections.write();
        let entries = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_owned()))?;

        let Some(entry) = entries
            .iter_mut()
            .find(|entry| entry_id(entry) == Some(id))
        else {
            return Ok(None);
        };

        if let QueryValue::Object(existing) = entry {
            merge(existing, changes);
        }

        Ok(Some(entry.clone()))
    }

    async fn delete(&self, collection: &str, id: &QueryValue) -> Result<Option<QueryValue>, StoreError> {
        let mut collections = self.collections.write();
        let entries = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_owned()))?;

        let position = entries.iter().position(|entry| entry_id(entry) == Some(id));
        Ok(position.map(|idx| entries.remove(idx)))
    }
}

fn entry_id(entry: &QueryValue) -> Option<&QueryValue> {
    entry.as_object().and_then(|object| object.get("id"))
}

/// The id property is the entry's identity and never changes through a merge.
fn merge(existing: &mut ObjectValue, changes: ObjectValue) {
    for (key, value) in changes {
        if key == "id" {
            continue;
        }
        existing.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_value::QueryValue;

    fn entry(pairs: &[(&str, QueryValue)]) -> QueryValue {
        QueryValue::object(pairs.iter().map(|(k, v)| ((*k).to_owned(), v.clone())))
    }

    #[tokio::test]
    async fn assigns_ids_past_the_seeded_maximum() {
        let store = InMemoryStore::new(["countries"]);
        store
            .seed(
                "countries",
                [entry(&[("id", QueryValue::Int(7)), ("isoCode", "DE".into())])],
            )
            .unwrap();

        let stored = store
            .insert("countries", entry(&[("isoCode", "FR".into())]))
            .await
            .unwrap();

        assert_eq!(entry_id(&stored), Some(&QueryValue::Int(8)));
    }

    #[tokio::test]
    async fn rejects_duplicate_ids() {
        let store = InMemoryStore::new(["countries"]);
        store
            .seed("countries", [entry(&[("id", QueryValue::Int(1))])])
            .unwrap();

        let err = store
            .insert("countries", entry(&[("id", QueryValue::Int(1))]))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn update_merges_and_preserves_the_id() {
        let store = InMemoryStore::new(["countries"]);
        store
            .seed(
                "countries",
                [entry(&[("id", QueryValue::Int(1)), ("name", "Germany".into())])],
            )
            .unwrap();

        let updated = store
            .update(
                "countries",
                &QueryValue::Int(1),
                entry(&[("id", QueryValue::Int(99)), ("name", "Deutschland".into())]),
            )
            .await
            .unwrap()
            .unwrap();

        let object = updated.as_object().unwrap();
        assert_eq!(object.get("id"), Some(&QueryValue::Int(1)));
        assert_eq!(object.get("name"), Some(&QueryValue::String("Deutschland".into())));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_entry() {
        let store = InMemoryStore::new(["countries"]);
        store
            .seed(
                "countries",
                [
                    entry(&[("id", QueryValue::Int(1))]),
                    entry(&[("id", QueryValue::Int(2))]),
                ],
            )
            .unwrap();

        let removed = store.delete("countries", &QueryValue::Int(1)).await.unwrap();
        assert!(removed.is_some());
        assert_eq!(store.list("countries").await.unwrap().len(), 1);
        assert!(store.delete("countries", &QueryValue::Int(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_collection_is_an_error() {
        let store = InMemoryStore::new(["countries"]);
        let err = store.list("cities").await.unwrap_err();
        assert_eq!(err, StoreError::UnknownCollection("cities".to_owned()));
    }
}
