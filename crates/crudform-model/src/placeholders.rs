//! Placeholder values for new items.
//!
//! When a new element is added to a list of objects, or an object field has
//! no value yet, the editor starts from an instance whose required fields are
//! filled from this table rather than left empty.
//!
//! | Type | Placeholder |
//! |---|---|
//! | `str` | `"Enter text"` |
//! | `int` / `float` | `0` / `0.0` |
//! | `bool` | `false` |
//! | `list` / `set` | `[]` |
//! | `dict` | `{}` |
//! | object | its own placeholder instance |
//! | union of objects | placeholder instance of the first variant |
//! | `Literal` | the first allowed value |
//! | `date` / `datetime` / `time` | 1970-01-01 / 1970-01-01T00:00 / 00:00 |
//! | `Path` | `.` |
//! | `Optional`, other | null |

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;

use crate::types::TypeTag;
use crate::value::Value;

/// Sentinel text of new string fields.
pub const PLACEHOLDER_TEXT: &str = "Enter text";

/// Returns the placeholder value of a declared type.
pub fn placeholder_for(tag: &TypeTag) -> Value {
    match tag {
        TypeTag::String => Value::String(PLACEHOLDER_TEXT.to_string()),
        TypeTag::Integer => Value::Int(0),
        TypeTag::Float => Value::Float(0.0),
        TypeTag::Boolean => Value::Bool(false),
        TypeTag::ListOf(_) | TypeTag::SetOf(_) => Value::List(Vec::new()),
        TypeTag::MapStringToAny => Value::Map(IndexMap::new()),
        TypeTag::ObjectType(schema) => Value::Object(schema.placeholder_instance()),
        TypeTag::UnionOfObjects(schemas) => schemas
            .first()
            .map_or(Value::Null, |s| Value::Object(s.placeholder_instance())),
        TypeTag::Literal(values) => values.first().cloned().unwrap_or(Value::Null),
        TypeTag::Date => Value::Date(NaiveDate::default()),
        TypeTag::DateTime => Value::DateTime(NaiveDateTime::default()),
        TypeTag::Time => Value::Time(NaiveTime::default()),
        TypeTag::Path => Value::Path(PathBuf::from(".")),
        TypeTag::Optional(_) | TypeTag::Other(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldDescriptor;
    use crate::schema::ModelSchema;

    #[test]
    fn test_scalars() {
        assert_eq!(placeholder_for(&TypeTag::String), Value::from("Enter text"));
        assert_eq!(placeholder_for(&TypeTag::Integer), Value::Int(0));
        assert_eq!(placeholder_for(&TypeTag::Float), Value::Float(0.0));
        assert_eq!(placeholder_for(&TypeTag::Boolean), Value::Bool(false));
        assert_eq!(placeholder_for(&TypeTag::Path), Value::Path(PathBuf::from(".")));
    }

    #[test]
    fn test_containers() {
        assert_eq!(placeholder_for(&TypeTag::list_of(TypeTag::String)), Value::List(vec![]));
        assert_eq!(placeholder_for(&TypeTag::set_of(TypeTag::Integer)), Value::List(vec![]));
        assert_eq!(placeholder_for(&TypeTag::MapStringToAny), Value::Map(IndexMap::new()));
    }

    #[test]
    fn test_temporal_epoch() {
        assert_eq!(placeholder_for(&TypeTag::Date).to_string(), "1970-01-01");
        assert_eq!(placeholder_for(&TypeTag::DateTime).to_string(), "1970-01-01T00:00:00");
        assert_eq!(placeholder_for(&TypeTag::Time).to_string(), "00:00:00");
    }

    #[test]
    fn test_optional_and_other_are_null() {
        assert_eq!(placeholder_for(&TypeTag::optional(TypeTag::Integer)), Value::Null);
        assert_eq!(placeholder_for(&TypeTag::Other("Any".into())), Value::Null);
    }

    #[test]
    fn test_literal_first_value() {
        assert_eq!(placeholder_for(&TypeTag::literal(["b", "a"])), Value::from("b"));
        assert_eq!(placeholder_for(&TypeTag::Literal(vec![])), Value::Null);
    }

    #[test]
    fn test_nested_objects_recurse() {
        let inner = ModelSchema::new("Inner")
            .field(FieldDescriptor::new("n", TypeTag::Integer))
            .build();
        let outer = ModelSchema::new("Outer")
            .field(FieldDescriptor::new("inner", TypeTag::ObjectType(inner.clone())))
            .build();
        let v = placeholder_for(&TypeTag::ObjectType(outer));
        let record = v.as_record().unwrap();
        let nested = record.get("inner").and_then(Value::as_record).unwrap();
        assert_eq!(nested.get("n"), Some(&Value::Int(0)));

        let union = TypeTag::UnionOfObjects(vec![inner]);
        assert_eq!(placeholder_for(&union).as_record().unwrap().class_name(), "Inner");
    }
}
