use super::*;
use crate::operation::Selection;
use expect_test::expect;
use query_schema::{Field, FieldResolver, ObjectType, OutputType};
use std::sync::Arc;

fn country_type() -> Arc<ObjectType> {
    let country = ObjectType::new("Country");
    country
        .set_fields(vec![
            Field::new(
                "isoCode",
                OutputType::string(),
                FieldResolver::Property {
                    key: "isoCode".into(),
                },
            ),
            Field::new(
                "name",
                OutputType::string(),
                FieldResolver::Property { key: "name".into() },
            ),
            Field::new(
                "neighbour",
                OutputType::object(country.clone()),
                FieldResolver::Reference {
                    collection: "countries".into(),
                    key: "neighbourId".into(),
                },
            ),
        ])
        .unwrap();
    country
}

fn query_root() -> Arc<ObjectType> {
    let country = country_type();
    let query = ObjectType::new("Query");
    query
        .set_fields(vec![
            Field::new(
                "serviceName",
                OutputType::string(),
                FieldResolver::Constant {
                    value: "shipping".into(),
                },
            ),
            Field::new(
                "allCountries",
                OutputType::object_list(country.clone()),
                FieldResolver::Collection {
                    collection: "countries".into(),
                },
            ),
            Field::new(
                "country",
                OutputType::object(country),
                FieldResolver::Entry {
                    collection: "countries".into(),
                },
            ),
        ])
        .unwrap();
    query
}

fn nested(name: &str, children: Vec<Selection>) -> Selection {
    Selection::new(name, None, Vec::new(), children)
}

#[test]
fn guards_every_object_and_list_boundary() {
    let root = query_root();
    let selection = vec![
        Selection::with_name("serviceName"),
        nested("allCountries", vec![Selection::with_name("isoCode")]),
    ];

    let tree = compile(&root, &selection).unwrap();

    expect![[r#"
        let
          object_0 = lit {}
        in
          if is object get object_0
          then
            object
              serviceName: lit "shipping"
              allCountries: let
                list_1 = leaf fetch countries
              in
                if is list get list_1
                then
                  map item_2 over get list_1
                    let
                      object_3 = get item_2
                    in
                      if is object get object_3
                      then
                        object
                          isoCode: prop isoCode of get object_3
                      else
                        null
                else
                  lit []
          else
            null"#]]
    .assert_eq(&tree.to_string());
}

#[test]
fn repeated_selections_share_one_binding() {
    let root = query_root();
    let mut first = nested("allCountries", vec![Selection::with_name("isoCode")]);
    first.set_alias(Some("a".to_owned()));
    let mut second = nested("allCountries", vec![Selection::with_name("name")]);
    second.set_alias(Some("b".to_owned()));

    let tree = compile(&root, &[first, second]).unwrap();
    let rendered = tree.to_string();

    // The collection fetch is hoisted once; both aliases read the binding.
    assert_eq!(rendered.matches("leaf fetch countries").count(), 1);
    assert_eq!(rendered.matches("get shared_1").count(), 2);
}

#[test]
fn selections_with_different_arguments_are_not_shared() {
    let root = query_root();
    let mut first = nested("allCountries", vec![Selection::with_name("isoCode")]);
    first.set_alias(Some("a".to_owned()));
    let mut second = nested("allCountries", vec![Selection::with_name("isoCode")]);
    second.set_alias(Some("b".to_owned()));
    second.push_argument("filter", QueryValue::object([("isoCode".to_owned(), "DE".into())]));

    let tree = compile(&root, &[first, second]).unwrap();
    let rendered = tree.to_string();

    assert_eq!(rendered.matches("leaf fetch countries").count(), 2);
    assert!(!rendered.contains("shared_"));
}

#[test]
fn recompilation_is_deterministic() {
    let root = query_root();
    let selection = vec![
        Selection::with_name("serviceName"),
        nested(
            "country",
            vec![
                Selection::with_name("isoCode"),
                nested("neighbour", vec![Selection::with_name("name")]),
            ],
        ),
    ];

    let first = compile(&root, &selection).unwrap();
    let second = compile(&root, &selection).unwrap();

    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn unknown_fields_are_rejected() {
    let root = query_root();
    let err = compile(&root, &[Selection::with_name("nope")]).unwrap_err();

    assert_eq!(
        err,
        CompileError::UnknownField {
            field: "nope".into(),
            object: "Query".into()
        }
    );
}

#[test]
fn duplicate_output_names_are_rejected() {
    let root = query_root();
    let selection = vec![
        Selection::with_name("serviceName"),
        Selection::with_name("serviceName"),
    ];

    let err = compile(&root, &selection).unwrap_err();

    assert_eq!(
        err,
        CompileError::DuplicateOutputName {
            name: "serviceName".into(),
            object: "Query".into()
        }
    );
}

#[test]
fn scalar_fields_reject_nested_selections() {
    let root = query_root();
    let selection = vec![nested("serviceName", vec![Selection::with_name("x")])];

    let err = compile(&root, &selection).unwrap_err();

    assert!(matches!(err, CompileError::NestedSelectionOnScalar { .. }));
}

#[test]
fn object_fields_require_nested_selections() {
    let root = query_root();
    let err = compile(&root, &[Selection::with_name("country")]).unwrap_err();

    assert!(matches!(err, CompileError::MissingNestedSelection { .. }));
}

#[test]
fn empty_selections_are_rejected() {
    let root = query_root();
    let err = compile(&root, &[]).unwrap_err();

    assert_eq!(err, CompileError::EmptySelection);
}

#[test]
fn pathological_depth_is_a_structural_error() {
    let root = query_root();

    let mut inner = nested("neighbour", vec![Selection::with_name("isoCode")]);
    for _ in 0..MAX_DEPTH + 2 {
        inner = nested("neighbour", vec![inner]);
    }
    let selection = vec![nested("country", vec![inner])];

    let err = compile(&root, &selection).unwrap_err();

    assert_eq!(err, CompileError::SelectionTooDeep { limit: MAX_DEPTH });
}
