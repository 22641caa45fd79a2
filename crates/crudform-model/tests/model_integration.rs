//! Integration tests for schemas, records, and JSON loading.

use std::sync::Arc;

use chrono::NaiveDate;
use crudform_core::error::CrudError;
use crudform_model::json::{records_from_json, records_to_json};
use crudform_model::{placeholder_for, FieldDescriptor, ModelSchema, TypeTag, Value};

fn sword() -> Arc<ModelSchema> {
    ModelSchema::new("Sword")
        .field(FieldDescriptor::new("edge", TypeTag::Integer).gt(0.0))
        .build()
}

fn bow() -> Arc<ModelSchema> {
    ModelSchema::new("Bow")
        .field(FieldDescriptor::new("range", TypeTag::Integer).default(30))
        .build()
}

fn character() -> Arc<ModelSchema> {
    ModelSchema::new("Character")
        .title("Character")
        .field(FieldDescriptor::new("id", TypeTag::Integer))
        .field(FieldDescriptor::new("name", TypeTag::String))
        .field(
            FieldDescriptor::new("born", TypeTag::optional(TypeTag::Date))
                .default(Value::Null),
        )
        .field(
            FieldDescriptor::new("tags", TypeTag::set_of(TypeTag::String))
                .default(Vec::<String>::new()),
        )
        .field(
            FieldDescriptor::new(
                "weapon",
                TypeTag::union(vec![
                    Some(TypeTag::ObjectType(sword())),
                    Some(TypeTag::ObjectType(bow())),
                    None,
                ]),
            )
            .default(Value::Null),
        )
        .build()
}

const PAYLOAD: &str = r#"[
    {"id": 1, "name": "Aragorn", "born": "2931-03-01", "tags": ["ranger", "king", "ranger"],
     "weapon": {"edge": 7}},
    {"id": 2, "name": "Legolas", "weapon": {"range": 120}},
    {"id": 3, "name": "Gimli", "axe": true}
]"#;

#[test]
fn test_load_payload() {
    let records = records_from_json(&character(), PAYLOAD).unwrap();
    assert_eq!(records.len(), 3);

    let aragorn = &records[0];
    assert_eq!(aragorn.value("born"), Value::Date(NaiveDate::from_ymd_opt(2931, 3, 1).unwrap()));
    assert_eq!(aragorn.value("tags"), Value::from(vec!["ranger", "king"]));
    assert_eq!(aragorn.value("weapon").as_record().unwrap().class_name(), "Sword");

    let legolas = &records[1];
    assert_eq!(legolas.value("weapon").as_record().unwrap().class_name(), "Bow");
    assert_eq!(legolas.value("born"), Value::Null);

    assert_eq!(records[2].value("weapon"), Value::Null);
    assert!(records[2].get("axe").is_none());
}

#[test]
fn test_union_normalization() {
    let weapon = character().get_field("weapon").unwrap().clone();
    let (effective, optional) = weapon.effective_type();
    assert!(optional);
    assert!(matches!(effective, TypeTag::UnionOfObjects(v) if v.len() == 2));
    assert_eq!(weapon.declared_type().type_key(), "Optional[Union[Sword, Bow]]");
}

#[test]
fn test_invalid_item_is_located() {
    let payload = r#"[{"id": 1, "name": "A"}, {"id": "x", "name": "B"}]"#;
    let err = records_from_json(&character(), payload).unwrap_err();
    let CrudError::Validation(e) = err else {
        panic!("expected a validation error");
    };
    assert_eq!(e.first().unwrap().loc, vec!["1", "id"]);
}

#[test]
fn test_non_array_payload() {
    let err = records_from_json(&character(), r#"{"id": 1}"#).unwrap_err();
    assert!(matches!(err, CrudError::SerializationError(_)));
    assert!(records_from_json(&character(), "not json").is_err());
}

#[test]
fn test_json_round_trip_of_loaded_records() {
    let records = records_from_json(&character(), PAYLOAD).unwrap();
    let json = records_to_json(&records);
    assert_eq!(json[0]["weapon"]["edge"], 7);
    assert_eq!(json[0]["born"], "2931-03-01");
    assert_eq!(json[1]["born"], serde_json::Value::Null);
    let again = records_from_json(&character(), &json.to_string()).unwrap();
    assert_eq!(again, records);
}

#[test]
fn test_placeholders_for_new_items() {
    let c = character();
    let placeholder = c.placeholder_instance();
    assert_eq!(placeholder.value("id"), Value::Int(0));
    assert_eq!(placeholder.value("name"), Value::from("Enter text"));
    assert_eq!(placeholder.value("tags"), Value::List(vec![]));

    let nested = placeholder_for(&TypeTag::ObjectType(sword()));
    assert_eq!(nested.as_record().unwrap().value("edge"), Value::Int(0));
    let first = placeholder_for(&TypeTag::UnionOfObjects(vec![bow(), sword()]));
    assert_eq!(first.as_record().unwrap().class_name(), "Bow");
}

#[test]
fn test_defaults_given() {
    assert!(!character().defaults_given());
    assert!(bow().defaults_given());
}
