//! Shared fixtures for the integration suite: a small shipping schema, a
//! seeded in-memory store, and instrumented store wrappers.

use async_trait::async_trait;
use memory_connector::InMemoryStore;
use query_ir::{Store, StoreError};
use query_schema::{
    AccessRule, AggregateOp, Field, FieldResolver, ObjectType, OutputType, QuerySchema, QuerySchemaRef,
};
use query_value::QueryValue;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tree_core::Selection;

fn prop(key: &str) -> FieldResolver {
    FieldResolver::Property { key: key.into() }
}

/// The shipping schema the whole suite runs against. Deliveries reference
/// countries by a stored foreign id, handling units point back at their
/// delivery, and two fields carry access rules.
pub fn shipping_schema() -> QuerySchemaRef {
    let country = ObjectType::new("Country");
    let delivery = ObjectType::new("Delivery");
    let handling_unit = ObjectType::new("HandlingUnit");

    country
        .set_fields(vec![
            Field::new("id", OutputType::int(), prop("id")),
            Field::new("isoCode", OutputType::string(), prop("isoCode")),
            Field::new("name", OutputType::string(), prop("name")),
        ])
        .unwrap();

    handling_unit
        .set_fields(vec![
            Field::new("id", OutputType::int(), prop("id")),
            Field::new("huNumber", OutputType::string(), prop("huNumber")),
            Field::new("weightInKg", OutputType::float(), prop("weightInKg")),
            Field::new(
                "delivery",
                OutputType::object(delivery.clone()),
                FieldResolver::Reference {
                    collection: "deliveries".into(),
                    key: "deliveryId".into(),
                },
            ),
        ])
        .unwrap();

    delivery
        .set_fields(vec![
            Field::new("id", OutputType::int(), prop("id")),
            Field::new("deliveryNumber", OutputType::string(), prop("deliveryNumber")),
            Field::new(
                "destinationCountry",
                OutputType::object(country.clone()),
                FieldResolver::Reference {
                    collection: "countries".into(),
                    key: "destinationCountryId".into(),
                },
            ),
            Field::new(
                "handlingUnits",
                OutputType::object_list(handling_unit.clone()),
                FieldResolver::Related {
                    collection: "handlingUnits".into(),
                    foreign_key: "deliveryId".into(),
                },
            ),
            Field::new(
                "totalWeightInKg",
                OutputType::float(),
                FieldResolver::Aggregate {
                    collection: "handlingUnits".into(),
                    foreign_key: "deliveryId".into(),
                    op: AggregateOp::Sum {
                        property: "weightInKg".into(),
                    },
                },
            ),
            Field::new(
                "handlingUnitCount",
                OutputType::int(),
                FieldResolver::Aggregate {
                    collection: "handlingUnits".into(),
                    foreign_key: "deliveryId".into(),
                    op: AggregateOp::Count,
                },
            ),
            Field::new("internalNotes", OutputType::string(), prop("internalNotes"))
                .with_access(AccessRule::Filter { role: "admin".into() }),
            Field::new("declaredValue", OutputType::float(), prop("declaredValue"))
                .with_access(AccessRule::Deny {
                    role: "finance".into(),
                }),
        ])
        .unwrap();

    let query = ObjectType::new("Query");
    query
        .set_fields(vec![
            Field::new(
                "serviceName",
                OutputType::string(),
                FieldResolver::Constant {
                    value: "shipping-engine".into(),
                },
            ),
            Field::new(
                "allCountries",
                OutputType::object_list(country),
                FieldResolver::Collection {
                    collection: "countries".into(),
                },
            ),
            Field::new(
                "allDeliveries",
                OutputType::object_list(delivery.clone()),
                FieldResolver::Collection {
                    collection: "deliveries".into(),
                },
            ),
            Field::new(
                "delivery",
                OutputType::object(delivery.clone()),
                FieldResolver::Entry {
                    collection: "deliveries".into(),
                },
            ),
        ])
        .unwrap();

    let mutation = ObjectType::new("Mutation");
    mutation
        .set_fields(vec![
            Field::new(
                "createDelivery",
                OutputType::object(delivery.clone()),
                FieldResolver::Create {
                    collection: "deliveries".into(),
                },
            ),
            Field::new(
                "updateDelivery",
                OutputType::object(delivery.clone()),
                FieldResolver::Update {
                    collection: "deliveries".into(),
                },
            ),
            Field::new(
                "deleteDelivery",
                OutputType::object(delivery),
                FieldResolver::Delete {
                    collection: "deliveries".into(),
                },
            ),
        ])
        .unwrap();

    Arc::new(QuerySchema::new(query, mutation))
}

pub fn value(json: serde_json::Value) -> QueryValue {
    QueryValue::try_from(json).unwrap()
}

/// Two countries, two deliveries (one without a destination), three handling
/// units.
pub fn seeded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new(["countries", "deliveries", "handlingUnits"]);

    store
        .seed(
            "countries",
            [
                value(json!({ "id": 1, "isoCode": "DE", "name": "Germany" })),
                value(json!({ "id": 2, "isoCode": "FR", "name": "France" })),
            ],
        )
        .unwrap();

    store
        .seed(
            "deliveries",
            [
                value(json!({
                    "id": 10,
                    "deliveryNumber": "D-1001",
                    "destinationCountryId": 1,
                    "internalNotes": "fragile goods",
                    "declaredValue": 1200.5,
                })),
                value(json!({
                    "id": 11,
                    "deliveryNumber": "D-1002",
                    "internalNotes": "no destination yet",
                    "declaredValue": 80.0,
                })),
            ],
        )
        .unwrap();

    store
        .seed(
            "handlingUnits",
            [
                value(json!({ "id": 100, "huNumber": "HU-1", "weightInKg": 12.5, "deliveryId": 10 })),
                value(json!({ "id": 101, "huNumber": "HU-2", "weightInKg": 7.5, "deliveryId": 10 })),
                value(json!({ "id": 102, "huNumber": "HU-3", "weightInKg": 3.0, "deliveryId": 11 })),
            ],
        )
        .unwrap();

    Arc::new(store)
}

pub fn sel(name: &str) -> Selection {
    Selection::with_name(name)
}

pub fn sel_nested(name: &str, children: Vec<Selection>) -> Selection {
    Selection::new(name, None, Vec::new(), children)
}

/// Delegates to an inner store while counting traversals, so tests can
/// assert how many store operations an evaluation paid for.
pub struct CountingStore {
    inner: Arc<dyn Store>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn Store>) -> Arc<CountingStore> {
        Arc::new(CountingStore {
            inner,
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        })
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Store for CountingStore {
    async fn list(&self, collection: &str) -> Result<Vec<QueryValue>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        self.inner.list(collection).await
    }

    async fn get(&self, collection: &str, id: &QueryValue) -> Result<Option<QueryValue>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        self.inner.get(collection, id).await
    }

    async fn insert(&self, collection: &str, entry: QueryValue) -> Result<QueryValue, StoreError> {
        self.inner.insert(collection, entry).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &QueryValue,
        changes: QueryValue,
    ) -> Result<Option<QueryValue>, StoreError> {
        self.inner.update(collection, id, changes).await
    }

    async fn delete(&self, collection: &str, id: &QueryValue) -> Result<Option<QueryValue>, StoreError> {
        self.inner.delete(collection, id).await
    }
}

/// Delegates everything except `get`, which fails with
/// [`StoreError::Unavailable`]. Used to prove that one failing leaf fails
/// the whole operation.
pub struct FailingStore {
    inner: Arc<dyn Store>,
}

impl FailingStore {
    pub fn new(inner: Arc<dyn Store>) -> Arc<FailingStore> {
        Arc::new(FailingStore { inner })
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn list(&self, collection: &str) -> Result<Vec<QueryValue>, StoreError> {
        self.inner.list(collection).await
    }

    async fn get(&self, _collection: &str, _id: &QueryValue) -> Result<Option<QueryValue>, StoreError> {
        Err(StoreError::Unavailable("simulated store outage".into()))
    }

    async fn insert(&self, collection: &str, entry: QueryValue) -> Result<QueryValue, StoreError> {
        self.inner.insert(collection, entry).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &QueryValue,
        changes: QueryValue,
    ) -> Result<Option<QueryValue>, StoreError> {
        self.inner.update(collection, id, changes).await
    }

    async fn delete(&self, collection: &str, id: &QueryValue) -> Result<Option<QueryValue>, StoreError> {
        self.inner.delete(collection, id).await
    }
}
