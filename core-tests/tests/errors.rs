use core_tests::{seeded_store, sel, sel_nested, shipping_schema, value, FailingStore};
use memory_connector::InMemoryStore;
use query_ir::{ExecutionContext, LeafError, Store, StoreError};
use query_value::QueryValue;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tree_core::{CoreError, CoreResult, InterpreterError, Operation, QueryExecutor};

async fn execute(ctx: &ExecutionContext, operation: Operation) -> CoreResult<QueryValue> {
    QueryExecutor::new(shipping_schema()).execute(&operation, ctx).await
}

fn leaf_error(err: CoreError) -> LeafError {
    match err {
        CoreError::InterpreterError(InterpreterError::Leaf(leaf)) => leaf,
        other => panic!("expected a leaf error, got {other}"),
    }
}

#[tokio::test]
async fn deny_rule_fails_the_whole_operation() {
    let ctx = ExecutionContext::new(seeded_store());
    let operation = Operation::Read(vec![sel_nested(
        "allDeliveries",
        vec![sel("deliveryNumber"), sel("declaredValue")],
    )]);

    let err = execute(&ctx, operation.clone()).await.unwrap_err();
    assert!(matches!(
        leaf_error(err),
        LeafError::AccessDenied { field } if field == "declaredValue"
    ));

    // The same request succeeds end to end once the role is granted.
    let authorized_ctx = ExecutionContext::new(seeded_store()).with_roles(["finance"]);
    let result = execute(&authorized_ctx, operation).await.unwrap();
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "allDeliveries": [
                { "deliveryNumber": "D-1001", "declaredValue": 1200.5 },
                { "deliveryNumber": "D-1002", "declaredValue": 80.0 }
            ]
        })
    );
}

#[tokio::test]
async fn one_failing_leaf_fails_the_whole_operation() {
    let failing: Arc<dyn Store> = FailingStore::new(seeded_store());
    let ctx = ExecutionContext::new(failing);

    // The list fetch succeeds; the per-item country lookup does not.
    let err = execute(
        &ctx,
        Operation::Read(vec![sel_nested(
            "allDeliveries",
            vec![
                sel("deliveryNumber"),
                sel_nested("destinationCountry", vec![sel("name")]),
            ],
        )]),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        leaf_error(err),
        LeafError::Store(StoreError::Unavailable(_))
    ));
}

#[tokio::test]
async fn cancelled_operations_stop_before_leaf_evaluation() {
    let token = CancellationToken::new();
    token.cancel();
    let ctx = ExecutionContext::new(seeded_store()).with_cancellation(token);

    let err = execute(
        &ctx,
        Operation::Read(vec![sel_nested("allCountries", vec![sel("name")])]),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        CoreError::InterpreterError(InterpreterError::Cancelled)
    ));
}

#[tokio::test]
async fn create_rejects_non_object_data() {
    let ctx = ExecutionContext::new(seeded_store());

    let mut create = sel_nested("createDelivery", vec![sel("id")]);
    create.push_argument("data", 42i64);

    let err = execute(&ctx, Operation::Write(vec![create])).await.unwrap_err();
    assert!(matches!(leaf_error(err), LeafError::InvalidInput { .. }));
}

#[tokio::test]
async fn sum_over_a_non_numeric_property_is_an_input_error() {
    let store = InMemoryStore::new(["deliveries", "handlingUnits"]);
    store
        .seed("deliveries", [value(json!({ "id": 1, "deliveryNumber": "D-1" }))])
        .unwrap();
    store
        .seed(
            "handlingUnits",
            [value(json!({ "id": 2, "deliveryId": 1, "weightInKg": "heavy" }))],
        )
        .unwrap();
    let ctx = ExecutionContext::new(Arc::new(store));

    let mut lookup = sel_nested("delivery", vec![sel("totalWeightInKg")]);
    lookup.push_argument("id", 1i64);

    let err = execute(&ctx, Operation::Read(vec![lookup])).await.unwrap_err();
    assert!(matches!(leaf_error(err), LeafError::InvalidInput { .. }));
}

#[tokio::test]
async fn unknown_collections_surface_as_store_errors() {
    let store = InMemoryStore::new(["countries"]);
    let ctx = ExecutionContext::new(Arc::new(store));

    let err = execute(
        &ctx,
        Operation::Read(vec![sel_nested("allDeliveries", vec![sel("id")])]),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        leaf_error(err),
        LeafError::Store(StoreError::UnknownCollection(name)) if name == "deliveries"
    ));
}
