//! The roster schema and its sample data.

use std::sync::Arc;

use crudform::model::{FieldDescriptor, InputType, ModelSchema, TypeTag, Value};

pub fn item() -> Arc<ModelSchema> {
    ModelSchema::new("Item")
        .title("Item")
        .field(FieldDescriptor::new("name", TypeTag::String).min_length(1))
        .field(
            FieldDescriptor::new("qty", TypeTag::Integer)
                .ge(0.0)
                .default(1),
        )
        .summary(|r| format!("{} x{}", r.value("name"), r.value("qty")))
        .build()
}

pub fn sword() -> Arc<ModelSchema> {
    ModelSchema::new("Sword")
        .title("Sword")
        .field(
            FieldDescriptor::new("edge", TypeTag::Integer)
                .gt(0.0)
                .le(20.0),
        )
        .build()
}

pub fn bow() -> Arc<ModelSchema> {
    ModelSchema::new("Bow")
        .title("Bow")
        .field(
            FieldDescriptor::new("range", TypeTag::Integer)
                .gt(0.0)
                .default(30),
        )
        .build()
}

pub fn character() -> Arc<ModelSchema> {
    ModelSchema::new("Character")
        .title("Character")
        .field(FieldDescriptor::new("id", TypeTag::String).title("Handle"))
        .field(FieldDescriptor::new("name", TypeTag::String).min_length(1))
        .field(
            FieldDescriptor::new("class", TypeTag::literal(["warrior", "mage", "rogue"]))
                .default("warrior"),
        )
        .field(
            FieldDescriptor::new("level", TypeTag::Integer)
                .ge(1.0)
                .le(100.0)
                .input_type(InputType::Slider)
                .default(1),
        )
        .field(
            FieldDescriptor::new("born", TypeTag::optional(TypeTag::Date))
                .default(Value::Null),
        )
        .field(
            FieldDescriptor::new("skills", TypeTag::set_of(TypeTag::String))
                .description("Things this character is good at")
                .default(Vec::<String>::new()),
        )
        .field(
            FieldDescriptor::new("inventory", TypeTag::list_of(TypeTag::ObjectType(item())))
                .default(Vec::<Value>::new()),
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
        .field(
            FieldDescriptor::new("bio", TypeTag::String)
                .input_type(InputType::Markdown)
                .default(""),
        )
        .build()
}

pub const ROSTER: &str = r#"[
    {"id": "strider", "name": "Aragorn", "class": "warrior", "level": 87, "born": "2931-03-01",
     "skills": ["tracking", "healing"],
     "inventory": [{"name": "pipe", "qty": 1}, {"name": "athelas", "qty": 4}],
     "weapon": {"edge": 18}, "bio": "Heir of *Isildur*."},
    {"id": "greenleaf", "name": "Legolas", "class": "rogue", "level": 80,
     "skills": ["archery"], "weapon": {"range": 150}},
    {"id": "boromir", "name": "Boromir", "class": "warrior", "level": 60,
     "inventory": [{"name": "horn", "qty": 1}], "weapon": {"edge": 15}}
]"#;
