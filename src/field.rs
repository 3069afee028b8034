use chrono::{DateTime, Utc};
use std::time::Duration;

/// Ordered sequence of fields. Keys are not deduplicated; append order is
/// preserved all the way into the backends.
pub type Fields = Vec<Field>;

/// A single typed key/value (or key/group) logging datum.
///
/// A `Field` is an immutable value: constructors are pure and no layer of the
/// crate ever mutates one after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

/// The closed set of value kinds a [`Field`] can carry.
///
/// `Group` holds an ordered child sequence and may nest arbitrarily deep;
/// depth limits, if any, are a backend concern. Because this is a sum type,
/// every translator match is exhaustive and there is no "unknown type" case
/// to degrade on.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Bool(bool),
    Int(i64),
    Uint64(u64),
    Float64(f64),
    Time(DateTime<Utc>),
    Duration(Duration),
    Group(Fields),
}

impl Field {
    /// String field.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Field {
        Field { key: key.into(), value: FieldValue::String(value.into()) }
    }

    /// Boolean field.
    pub fn bool(key: impl Into<String>, value: bool) -> Field {
        Field { key: key.into(), value: FieldValue::Bool(value) }
    }

    /// Signed integer field.
    pub fn int(key: impl Into<String>, value: i64) -> Field {
        Field { key: key.into(), value: FieldValue::Int(value) }
    }

    /// Unsigned 64-bit integer field.
    pub fn uint64(key: impl Into<String>, value: u64) -> Field {
        Field { key: key.into(), value: FieldValue::Uint64(value) }
    }

    /// 64-bit float field.
    pub fn float64(key: impl Into<String>, value: f64) -> Field {
        Field { key: key.into(), value: FieldValue::Float64(value) }
    }

    /// Timestamp field.
    pub fn time(key: impl Into<String>, value: DateTime<Utc>) -> Field {
        Field { key: key.into(), value: FieldValue::Time(value) }
    }

    /// Elapsed-time field.
    pub fn duration(key: impl Into<String>, value: Duration) -> Field {
        Field { key: key.into(), value: FieldValue::Duration(value) }
    }

    /// Named group of child fields. Groups may contain further groups.
    pub fn group(name: impl Into<String>, fields: Fields) -> Field {
        Field { key: name.into(), value: FieldValue::Group(fields) }
    }
}

/// Rebuild a field sequence from a keyed JSON form.
///
/// This is the inverse direction of the JSON translator: nested objects come
/// back as groups, scalars as their closest field kind. Times and durations
/// have already collapsed to strings/numbers by that point, which is fine for
/// re-emission. Values with no field equivalent (arrays, nulls) are carried
/// as their JSON text.
pub fn fields_from_json(map: &serde_json::Map<String, serde_json::Value>) -> Fields {
    let mut fields = Vec::with_capacity(map.len());
    for (key, value) in map {
        fields.push(field_from_json(key, value));
    }
    fields
}

fn field_from_json(key: &str, value: &serde_json::Value) -> Field {
    use serde_json::Value;

    match value {
        Value::String(s) => Field::string(key, s.clone()),
        Value::Bool(b) => Field::bool(key, *b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Field::int(key, i)
            } else if let Some(u) = n.as_u64() {
                Field::uint64(key, u)
            } else {
                Field::float64(key, n.as_f64().unwrap_or(0.0))
            }
        }
        Value::Object(map) => Field::group(key, fields_from_json(map)),
        other => Field::string(key, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_tag_the_matching_kind() {
        assert_eq!(Field::string("k", "v").value, FieldValue::String("v".into()));
        assert_eq!(Field::bool("k", true).value, FieldValue::Bool(true));
        assert_eq!(Field::int("k", -3).value, FieldValue::Int(-3));
        assert_eq!(Field::uint64("k", 7).value, FieldValue::Uint64(7));
        assert_eq!(Field::float64("k", 0.5).value, FieldValue::Float64(0.5));

        let dur = Duration::from_millis(1500);
        assert_eq!(Field::duration("k", dur).value, FieldValue::Duration(dur));
    }

    #[test]
    fn groups_nest_without_limit() {
        let inner = Field::group("inner", vec![Field::int("depth", 2)]);
        let outer = Field::group("outer", vec![Field::int("depth", 1), inner]);

        match outer.value {
            FieldValue::Group(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(children[1].value, FieldValue::Group(_)));
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn json_map_rebuilds_as_fields() {
        let json: serde_json::Value = serde_json::json!({
            "id": "1",
            "count": 3,
            "ratio": 0.25,
            "user": { "active": true },
        });
        let map = json.as_object().expect("object");

        let fields = fields_from_json(map);
        assert_eq!(fields[0], Field::string("id", "1"));
        assert_eq!(fields[1], Field::int("count", 3));
        assert_eq!(fields[2], Field::float64("ratio", 0.25));
        assert_eq!(
            fields[3],
            Field::group("user", vec![Field::bool("active", true)])
        );
    }
}
