//! Declared field types.
//!
//! A [`TypeTag`] is produced once per field when a schema is declared and never
//! changes afterwards. Handler dispatch pattern-matches on it; its `Display`
//! form is the *type key* that, with the field's input-type hint, keys the
//! handler resolution cache.
//!
//! [`TypeTag::coerce`] implements lax input coercion: the conversions a form
//! needs (numeric strings to numbers, ISO strings to dates, maps to nested
//! objects) are accepted, anything else is rejected with a structured
//! [`ErrorDetail`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use crudform_core::error::{ErrorDetail, ValidationError};

use crate::schema::ModelSchema;
use crate::value::Value;

/// The normalized declared type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeTag {
    /// Free text.
    String,
    /// A whole number.
    Integer,
    /// A floating-point number.
    Float,
    /// A boolean.
    Boolean,
    /// A calendar date.
    Date,
    /// A time of day.
    Time,
    /// A date and time of day.
    DateTime,
    /// A filesystem path.
    Path,
    /// One of a fixed set of values.
    Literal(Vec<Value>),
    /// The inner type or none.
    Optional(Box<TypeTag>),
    /// One of several object types, chosen with a class switcher.
    UnionOfObjects(Vec<Arc<ModelSchema>>),
    /// An ordered list of elements.
    ListOf(Box<TypeTag>),
    /// A collection of distinct elements.
    SetOf(Box<TypeTag>),
    /// A string-keyed map with arbitrary values.
    MapStringToAny,
    /// A nested object.
    ObjectType(Arc<ModelSchema>),
    /// A type without a dedicated handler, named for diagnostics.
    Other(String),
}

impl TypeTag {
    /// Wraps `inner` in [`TypeTag::Optional`].
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Builds a [`TypeTag::ListOf`].
    pub fn list_of(element: Self) -> Self {
        Self::ListOf(Box::new(element))
    }

    /// Builds a [`TypeTag::SetOf`].
    pub fn set_of(element: Self) -> Self {
        Self::SetOf(Box::new(element))
    }

    /// Builds a [`TypeTag::Literal`] from anything convertible to values.
    pub fn literal<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::Literal(values.into_iter().map(Into::into).collect())
    }

    /// Normalizes a union declaration. `None` entries stand for the none arm.
    ///
    /// - `[T, none]` becomes `Optional(T)`;
    /// - a single arm is returned unchanged;
    /// - two or more object arms become `UnionOfObjects`, wrapped in
    ///   `Optional` when a none arm is present;
    /// - anything else becomes [`TypeTag::Other`].
    ///
    /// # Examples
    ///
    /// ```
    /// use crudform_model::types::TypeTag;
    ///
    /// let t = TypeTag::union(vec![Some(TypeTag::Integer), None]);
    /// assert_eq!(t, TypeTag::optional(TypeTag::Integer));
    /// let t = TypeTag::union(vec![Some(TypeTag::Integer), Some(TypeTag::String)]);
    /// assert_eq!(t.to_string(), "Union[int, str]");
    /// ```
    pub fn union(arms: Vec<Option<Self>>) -> Self {
        if arms.len() == 2 && arms[1].is_none() {
            if let Some(first) = &arms[0] {
                return Self::optional(first.clone());
            }
        }

        let has_none = arms.iter().any(Option::is_none);
        let types: Vec<Self> = arms.iter().flatten().cloned().collect();

        if let ([only], false) = (types.as_slice(), has_none) {
            return only.clone();
        }

        let schemas: Vec<Arc<ModelSchema>> = types
            .iter()
            .filter_map(|t| match t {
                Self::ObjectType(schema) => Some(Arc::clone(schema)),
                _ => None,
            })
            .collect();
        if schemas.len() >= 2 && schemas.len() == types.len() {
            let switcher = Self::UnionOfObjects(schemas);
            return if has_none { Self::optional(switcher) } else { switcher };
        }

        let names: Vec<String> = arms
            .iter()
            .map(|a| a.as_ref().map_or_else(|| "None".to_string(), ToString::to_string))
            .collect();
        Self::Other(format!("Union[{}]", names.join(", ")))
    }

    /// Returns the canonical type key used for handler caching.
    pub fn type_key(&self) -> String {
        self.to_string()
    }

    /// Returns `true` for [`TypeTag::Optional`].
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Strips one level of [`TypeTag::Optional`].
    pub fn unwrap_optional(&self) -> &Self {
        match self {
            Self::Optional(inner) => inner,
            other => other,
        }
    }

    /// Returns the element type of a list or set.
    pub fn element_type(&self) -> Option<&Self> {
        match self {
            Self::ListOf(e) | Self::SetOf(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the schema of an object type.
    pub const fn object_schema(&self) -> Option<&Arc<ModelSchema>> {
        match self {
            Self::ObjectType(schema) => Some(schema),
            _ => None,
        }
    }

    /// Returns `true` for scalar numeric types.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Returns `true` for date, time, and datetime.
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::DateTime)
    }

    /// Coerces `value` into this type.
    ///
    /// Error locations are relative to the value (list indices, nested field
    /// names); the caller prefixes the field name.
    pub fn coerce(&self, value: Value) -> Result<Value, ValidationError> {
        match self {
            Self::Optional(inner) => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    inner.coerce(value)
                }
            }
            Self::Other(_) => Ok(value),
            Self::Literal(options) => coerce_literal(options, value),
            Self::ListOf(element) => coerce_list(element, value, false),
            Self::SetOf(element) => coerce_list(element, value, true),
            Self::ObjectType(schema) => coerce_object(std::slice::from_ref(schema), value),
            Self::UnionOfObjects(schemas) => coerce_object(schemas, value),
            Self::MapStringToAny => match value {
                Value::Map(m) => Ok(Value::Map(m)),
                Value::Object(r) => Ok(Value::Map(r.dump())),
                _ => Err(invalid("Input should be a valid dictionary", "dict_type")),
            },
            scalar => coerce_scalar(scalar, value).map_err(ValidationError::new),
        }
    }
}

fn invalid(msg: &str, kind: &str) -> ValidationError {
    ValidationError::new(ErrorDetail::new(msg, kind))
}

fn coerce_scalar(tag: &TypeTag, value: Value) -> Result<Value, ErrorDetail> {
    match (tag, value) {
        (TypeTag::String, Value::String(s)) => Ok(Value::String(s)),
        (TypeTag::String, _) => mismatch("Input should be a valid string", "string_type"),

        (TypeTag::Integer, Value::Int(i)) => Ok(Value::Int(i)),
        (TypeTag::Integer, Value::Float(f)) => float_to_int(f),
        (TypeTag::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Value::Int(i)),
            Err(_) => mismatch(
                "Input should be a valid integer, unable to parse string as an integer",
                "int_parsing",
            ),
        },
        (TypeTag::Integer, _) => mismatch("Input should be a valid integer", "int_type"),

        (TypeTag::Float, Value::Float(f)) => Ok(Value::Float(f)),
        (TypeTag::Float, v @ Value::Int(_)) => Ok(Value::Float(v.as_f64().unwrap_or_default())),
        (TypeTag::Float, Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(f) => Ok(Value::Float(f)),
            Err(_) => mismatch(
                "Input should be a valid number, unable to parse string as a number",
                "float_parsing",
            ),
        },
        (TypeTag::Float, _) => mismatch("Input should be a valid number", "float_type"),

        (TypeTag::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
        (TypeTag::Boolean, Value::Int(0)) => Ok(Value::Bool(false)),
        (TypeTag::Boolean, Value::Int(1)) => Ok(Value::Bool(true)),
        (TypeTag::Boolean, Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "y" | "t" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" | "n" | "f" => Ok(Value::Bool(false)),
            _ => mismatch(
                "Input should be a valid boolean, unable to interpret input",
                "bool_parsing",
            ),
        },
        (TypeTag::Boolean, _) => mismatch("Input should be a valid boolean", "bool_type"),

        (TypeTag::Date, Value::Date(d)) => Ok(Value::Date(d)),
        (TypeTag::Date, Value::String(s)) => match parse_date(&s) {
            Some(d) => Ok(Value::Date(d)),
            None => mismatch(
                "Input should be a valid date in the format YYYY-MM-DD",
                "date_from_datetime_parsing",
            ),
        },
        (TypeTag::Date, _) => mismatch("Input should be a valid date", "date_type"),

        (TypeTag::Time, Value::Time(t)) => Ok(Value::Time(t)),
        (TypeTag::Time, Value::String(s)) => match parse_time(&s) {
            Some(t) => Ok(Value::Time(t)),
            None => mismatch("Input should be in a valid time format", "time_parsing"),
        },
        (TypeTag::Time, _) => mismatch("Input should be a valid time", "time_type"),

        (TypeTag::DateTime, Value::DateTime(dt)) => Ok(Value::DateTime(dt)),
        (TypeTag::DateTime, Value::Date(d)) => Ok(Value::DateTime(d.and_time(NaiveTime::MIN))),
        (TypeTag::DateTime, Value::String(s)) => match parse_datetime(&s) {
            Some(dt) => Ok(Value::DateTime(dt)),
            None => mismatch("Input should be a valid datetime", "datetime_parsing"),
        },
        (TypeTag::DateTime, _) => mismatch("Input should be a valid datetime", "datetime_type"),

        (TypeTag::Path, Value::Path(p)) => Ok(Value::Path(p)),
        (TypeTag::Path, Value::String(s)) => Ok(Value::Path(PathBuf::from(s))),
        (TypeTag::Path, _) => mismatch("Input is not a valid path", "path_type"),

        (other, value) => Err(ErrorDetail::new(
            format!("Cannot coerce {} into {other}", value.kind()),
            "type_error",
        )),
    }
}

fn mismatch(msg: &str, kind: &str) -> Result<Value, ErrorDetail> {
    Err(ErrorDetail::new(msg, kind))
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_int(f: f64) -> Result<Value, ErrorDetail> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Ok(Value::Int(f as i64))
    } else {
        Err(ErrorDetail::new(
            "Input should be a valid integer, got a number with a fractional part",
            "int_from_float",
        ))
    }
}

fn coerce_literal(options: &[Value], value: Value) -> Result<Value, ValidationError> {
    if options.contains(&value) {
        return Ok(value);
    }
    // Select widgets hand back the string form of the chosen option.
    if let Value::String(s) = &value {
        if let Some(option) = options.iter().find(|o| o.to_string() == *s) {
            return Ok(option.clone());
        }
    }
    Err(invalid(
        &format!("Input should be {}", literal_choices(options)),
        "literal_error",
    ))
}

fn literal_repr(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

fn literal_choices(options: &[Value]) -> String {
    let reprs: Vec<String> = options.iter().map(literal_repr).collect();
    match reprs.as_slice() {
        [] => "nothing".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

fn coerce_list(element: &TypeTag, value: Value, unique: bool) -> Result<Value, ValidationError> {
    let Value::List(items) = value else {
        let (msg, kind) = if unique {
            ("Input should be a valid set", "set_type")
        } else {
            ("Input should be a valid list", "list_type")
        };
        return Err(invalid(msg, kind));
    };

    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        match element.coerce(item) {
            Ok(v) => {
                if !unique || !out.contains(&v) {
                    out.push(v);
                }
            }
            Err(e) => errors.extend(e.within(&i.to_string()).errors),
        }
    }
    if errors.is_empty() {
        Ok(Value::List(out))
    } else {
        Err(ValidationError::from_details(errors))
    }
}

fn coerce_object(schemas: &[Arc<ModelSchema>], value: Value) -> Result<Value, ValidationError> {
    match value {
        Value::Object(record) => {
            let schema = schemas
                .iter()
                .find(|s| s.name() == record.class_name())
                .ok_or_else(|| object_type_error(schemas))?;
            // An instance is stored only if it validates against its schema.
            schema.create(record.dump()).map(Value::Object)
        }
        Value::Map(map) => {
            let mut first_error = None;
            for schema in schemas {
                match schema.create(map.clone()) {
                    Ok(record) => return Ok(Value::Object(record)),
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
            Err(first_error.unwrap_or_else(|| object_type_error(schemas)))
        }
        _ => Err(object_type_error(schemas)),
    }
}

fn object_type_error(schemas: &[Arc<ModelSchema>]) -> ValidationError {
    let names: Vec<&str> = schemas.iter().map(|s| s.name()).collect();
    invalid(
        &format!(
            "Input should be a valid dictionary or instance of {}",
            names.join(" or ")
        ),
        "model_type",
    )
}

// ── ISO-8601 parsing ───────────────────────────────────────────────────

/// Parses an ISO-8601 date (`YYYY-MM-DD`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parses an ISO-8601 time (`HH:MM`, `HH:MM:SS`, or with fractional seconds).
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Parses an ISO-8601 datetime. The separator may be `T` or a space, seconds
/// are optional, and a bare date means midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    parse_date(s).map(|d| d.and_time(NaiveTime::MIN))
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "str"),
            Self::Integer => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "bool"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::DateTime => write!(f, "datetime"),
            Self::Path => write!(f, "Path"),
            Self::Literal(values) => {
                let reprs: Vec<String> = values.iter().map(literal_repr).collect();
                write!(f, "Literal[{}]", reprs.join(", "))
            }
            Self::Optional(inner) => write!(f, "Optional[{inner}]"),
            Self::UnionOfObjects(schemas) => {
                let names: Vec<&str> = schemas.iter().map(|s| s.name()).collect();
                write!(f, "Union[{}]", names.join(", "))
            }
            Self::ListOf(e) => write!(f, "list[{e}]"),
            Self::SetOf(e) => write!(f, "set[{e}]"),
            Self::MapStringToAny => write!(f, "dict[str, Any]"),
            Self::ObjectType(schema) => write!(f, "{}", schema.name()),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}
