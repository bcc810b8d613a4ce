use core_tests::{seeded_store, sel, sel_nested, shipping_schema, CountingStore};
use memory_connector::InMemoryStore;
use pretty_assertions::assert_eq;
use query_ir::{ExecutionContext, Store};
use query_value::QueryValue;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tree_core::{CoreResult, EvaluationProfile, Operation, ProfileSink, QueryExecutor, Selection};

async fn read(store: Arc<dyn Store>, selections: Vec<Selection>) -> CoreResult<QueryValue> {
    let executor = QueryExecutor::new(shipping_schema());
    let ctx = ExecutionContext::new(store);
    executor.execute(&Operation::Read(selections), &ctx).await
}

async fn read_with_roles(
    store: Arc<dyn Store>,
    roles: &[&str],
    selections: Vec<Selection>,
) -> CoreResult<QueryValue> {
    let executor = QueryExecutor::new(shipping_schema());
    let ctx = ExecutionContext::new(store).with_roles(roles.iter().copied());
    executor.execute(&Operation::Read(selections), &ctx).await
}

#[tokio::test]
async fn constant_fields_read_without_a_store_roundtrip() {
    let result = read(seeded_store(), vec![sel("serviceName")]).await.unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "serviceName": "shipping-engine" })
    );
}

#[tokio::test]
async fn empty_collections_yield_empty_lists_not_null() {
    let store = Arc::new(InMemoryStore::new(["countries", "deliveries", "handlingUnits"]));

    let result = read(
        store,
        vec![sel_nested("allDeliveries", vec![sel("deliveryNumber")])],
    )
    .await
    .unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "allDeliveries": [] })
    );
}

#[tokio::test]
async fn nested_references_resolve_and_absence_degrades_to_null() {
    let result = read(
        seeded_store(),
        vec![sel_nested(
            "allDeliveries",
            vec![
                sel("deliveryNumber"),
                sel_nested("destinationCountry", vec![sel("isoCode"), sel("name")]),
            ],
        )],
    )
    .await
    .unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "allDeliveries": [
                {
                    "deliveryNumber": "D-1001",
                    "destinationCountry": { "isoCode": "DE", "name": "Germany" }
                },
                {
                    "deliveryNumber": "D-1002",
                    "destinationCountry": null
                }
            ]
        })
    );
}

#[tokio::test]
async fn output_preserves_selection_order() {
    let result = read(
        seeded_store(),
        vec![{
            let mut entry = sel_nested("delivery", vec![sel("deliveryNumber"), sel("id")]);
            entry.push_argument("id", 10i64);
            entry
        }],
    )
    .await
    .unwrap();

    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"delivery":{"deliveryNumber":"D-1001","id":10}}"#
    );
}

#[tokio::test]
async fn collection_filter_narrows_by_property_equality() {
    let mut entry = sel_nested("allCountries", vec![sel("name")]);
    entry.push_argument("filter", QueryValue::object([("isoCode".to_owned(), "DE".into())]));

    let result = read(seeded_store(), vec![entry]).await.unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "allCountries": [{ "name": "Germany" }] })
    );
}

#[tokio::test]
async fn entry_lookup_without_a_match_yields_null() {
    let mut entry = sel_nested("delivery", vec![sel("id")]);
    entry.push_argument("id", 999i64);

    let result = read(seeded_store(), vec![entry]).await.unwrap();

    assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "delivery": null }));
}

#[tokio::test]
async fn entry_lookup_without_an_id_skips_the_store() {
    let counting = CountingStore::new(seeded_store());

    let result = read(
        counting.clone(),
        vec![sel_nested("delivery", vec![sel("id")])],
    )
    .await
    .unwrap();

    assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "delivery": null }));
    assert_eq!(counting.get_calls(), 0);
}

#[tokio::test]
async fn aliased_repeats_of_one_field_fetch_once() {
    let counting = CountingStore::new(seeded_store());

    let mut numbers = sel_nested("allDeliveries", vec![sel("deliveryNumber")]);
    numbers.set_alias(Some("numbers".to_owned()));
    let mut ids = sel_nested("allDeliveries", vec![sel("id")]);
    ids.set_alias(Some("ids".to_owned()));

    let result = read(counting.clone(), vec![numbers, ids]).await.unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "numbers": [{ "deliveryNumber": "D-1001" }, { "deliveryNumber": "D-1002" }],
            "ids": [{ "id": 10 }, { "id": 11 }]
        })
    );
    assert_eq!(counting.list_calls(), 1);
}

#[tokio::test]
async fn aggregates_traverse_the_relation_once_per_delivery() {
    let result = read(
        seeded_store(),
        vec![sel_nested(
            "allDeliveries",
            vec![sel("deliveryNumber"), sel("totalWeightInKg"), sel("handlingUnitCount")],
        )],
    )
    .await
    .unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "allDeliveries": [
                { "deliveryNumber": "D-1001", "totalWeightInKg": 20.0, "handlingUnitCount": 2 },
                { "deliveryNumber": "D-1002", "totalWeightInKg": 3.0, "handlingUnitCount": 1 }
            ]
        })
    );
}

#[tokio::test]
async fn relations_can_be_followed_back_to_their_source() {
    let mut entry = sel_nested(
        "delivery",
        vec![sel_nested(
            "handlingUnits",
            vec![
                sel("huNumber"),
                sel_nested("delivery", vec![sel("deliveryNumber")]),
            ],
        )],
    );
    entry.push_argument("id", 10i64);

    let result = read(seeded_store(), vec![entry]).await.unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "delivery": {
                "handlingUnits": [
                    { "huNumber": "HU-1", "delivery": { "deliveryNumber": "D-1001" } },
                    { "huNumber": "HU-2", "delivery": { "deliveryNumber": "D-1001" } }
                ]
            }
        })
    );
}

#[tokio::test]
async fn filter_rule_nulls_the_field_without_the_role() {
    let selections = || {
        vec![sel_nested(
            "allDeliveries",
            vec![sel("deliveryNumber"), sel("internalNotes")],
        )]
    };

    let unauthorized = read(seeded_store(), selections()).await.unwrap();
    assert_eq!(
        serde_json::to_value(&unauthorized).unwrap(),
        json!({
            "allDeliveries": [
                { "deliveryNumber": "D-1001", "internalNotes": null },
                { "deliveryNumber": "D-1002", "internalNotes": null }
            ]
        })
    );

    let authorized = read_with_roles(seeded_store(), &["admin"], selections())
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(&authorized).unwrap(),
        json!({
            "allDeliveries": [
                { "deliveryNumber": "D-1001", "internalNotes": "fragile goods" },
                { "deliveryNumber": "D-1002", "internalNotes": "no destination yet" }
            ]
        })
    );
}

#[derive(Default)]
struct RecordingSink {
    profiles: Mutex<Vec<EvaluationProfile>>,
}

impl ProfileSink for RecordingSink {
    fn record(&self, profile: EvaluationProfile) {
        self.profiles.lock().unwrap().push(profile);
    }
}

#[tokio::test]
async fn profile_sink_receives_evaluation_metrics() {
    let sink = Arc::new(RecordingSink::default());
    let executor = QueryExecutor::new(shipping_schema()).with_profile_sink(sink.clone());
    let ctx = ExecutionContext::new(seeded_store());

    executor
        .execute(
            &Operation::Read(vec![sel_nested("allCountries", vec![sel("name")])]),
            &ctx,
        )
        .await
        .unwrap();

    let profiles = sink.profiles.lock().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].leaf_evaluations, 1);
    assert!(profiles[0].bindings_evaluated > 0);
}
