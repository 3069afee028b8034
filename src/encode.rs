use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::time::Duration;

use crate::field::{Field, FieldValue};

/// Per-backend emission strategy consumed by [`encode_fields`].
///
/// A backend that wants fields in its native shape implements one typed emit
/// per scalar kind plus a group scope pair; the recursive walk over nested
/// groups lives in [`encode_fields`] and is written exactly once.
pub trait FieldEncoder {
    fn emit_string(&mut self, key: &str, value: &str);
    fn emit_bool(&mut self, key: &str, value: bool);
    fn emit_int(&mut self, key: &str, value: i64);
    fn emit_uint64(&mut self, key: &str, value: u64);
    fn emit_float64(&mut self, key: &str, value: f64);
    fn emit_time(&mut self, key: &str, value: DateTime<Utc>);
    fn emit_duration(&mut self, key: &str, value: Duration);

    /// Enter the scope of a named group; every emit until the matching
    /// [`close_group`](FieldEncoder::close_group) belongs to it.
    fn open_group(&mut self, key: &str);
    fn close_group(&mut self);
}

/// Walk a field sequence in order, dispatching each scalar to the strategy
/// and recursing into groups. Pure: the input is never mutated and the
/// encoder owns whatever structure it is building.
pub fn encode_fields(fields: &[Field], encoder: &mut dyn FieldEncoder) {
    for field in fields {
        match &field.value {
            FieldValue::String(v) => encoder.emit_string(&field.key, v),
            FieldValue::Bool(v) => encoder.emit_bool(&field.key, *v),
            FieldValue::Int(v) => encoder.emit_int(&field.key, *v),
            FieldValue::Uint64(v) => encoder.emit_uint64(&field.key, *v),
            FieldValue::Float64(v) => encoder.emit_float64(&field.key, *v),
            FieldValue::Time(v) => encoder.emit_time(&field.key, *v),
            FieldValue::Duration(v) => encoder.emit_duration(&field.key, *v),
            FieldValue::Group(children) => {
                encoder.open_group(&field.key);
                encode_fields(children, encoder);
                encoder.close_group();
            }
        }
    }
}

/// Strategy for keyed map backends: builds a `serde_json` object, one entry
/// per field, with groups as nested objects. Duplicate keys overwrite, which
/// is this backend's own semantics, not something normalized here.
///
/// Times are carried as RFC 3339 strings, durations as seconds.
pub struct JsonEncoder {
    // innermost scope last; the bottom entry is the root and has no key
    stack: Vec<(Option<String>, serde_json::Map<String, serde_json::Value>)>,
}

impl JsonEncoder {
    pub fn new() -> Self {
        JsonEncoder { stack: vec![(None, serde_json::Map::new())] }
    }

    /// Consume the encoder and return the built object. Unbalanced group
    /// scopes are closed implicitly.
    pub fn finish(mut self) -> serde_json::Map<String, serde_json::Value> {
        while self.stack.len() > 1 {
            self.close_group();
        }
        match self.stack.pop() {
            Some((_, map)) => map,
            None => serde_json::Map::new(),
        }
    }

    fn insert(&mut self, key: &str, value: serde_json::Value) {
        if let Some((_, map)) = self.stack.last_mut() {
            map.insert(key.to_string(), value);
        }
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn json_number(value: f64) -> serde_json::Value {
    match serde_json::Number::from_f64(value) {
        Some(n) => serde_json::Value::Number(n),
        None => serde_json::Value::Null,
    }
}

impl FieldEncoder for JsonEncoder {
    fn emit_string(&mut self, key: &str, value: &str) {
        self.insert(key, serde_json::Value::String(value.to_string()));
    }

    fn emit_bool(&mut self, key: &str, value: bool) {
        self.insert(key, serde_json::Value::Bool(value));
    }

    fn emit_int(&mut self, key: &str, value: i64) {
        self.insert(key, serde_json::Value::Number(value.into()));
    }

    fn emit_uint64(&mut self, key: &str, value: u64) {
        self.insert(key, serde_json::Value::Number(value.into()));
    }

    fn emit_float64(&mut self, key: &str, value: f64) {
        let number = json_number(value);
        self.insert(key, number);
    }

    fn emit_time(&mut self, key: &str, value: DateTime<Utc>) {
        self.insert(key, serde_json::Value::String(value.to_rfc3339()));
    }

    fn emit_duration(&mut self, key: &str, value: Duration) {
        let number = json_number(value.as_secs_f64());
        self.insert(key, number);
    }

    fn open_group(&mut self, key: &str) {
        self.stack.push((Some(key.to_string()), serde_json::Map::new()));
    }

    fn close_group(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some((key, map)) = self.stack.pop() {
            let key = key.unwrap_or_default();
            self.insert(&key, serde_json::Value::Object(map));
        }
    }
}

/// Strategy for the plain text renderer: space-separated `key=value`
/// segments, with group scopes contributing a dotted key prefix
/// (`group.child=value`). Order of emission is append order.
pub struct TextEncoder {
    buf: String,
    prefix: Vec<String>,
}

impl TextEncoder {
    pub fn new() -> Self {
        TextEncoder { buf: String::new(), prefix: Vec::new() }
    }

    pub fn finish(self) -> String {
        self.buf
    }

    fn push_key(&mut self, key: &str) {
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }
        for part in &self.prefix {
            self.buf.push_str(part);
            self.buf.push('.');
        }
        self.buf.push_str(key);
        self.buf.push('=');
    }
}

impl Default for TextEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldEncoder for TextEncoder {
    fn emit_string(&mut self, key: &str, value: &str) {
        self.push_key(key);
        let needs_quotes =
            value.is_empty() || value.contains(|c: char| c.is_whitespace() || c == '"' || c == '=');
        if needs_quotes {
            let _ = write!(self.buf, "{value:?}");
        } else {
            self.buf.push_str(value);
        }
    }

    fn emit_bool(&mut self, key: &str, value: bool) {
        self.push_key(key);
        let _ = write!(self.buf, "{value}");
    }

    fn emit_int(&mut self, key: &str, value: i64) {
        self.push_key(key);
        let _ = write!(self.buf, "{value}");
    }

    fn emit_uint64(&mut self, key: &str, value: u64) {
        self.push_key(key);
        let _ = write!(self.buf, "{value}");
    }

    fn emit_float64(&mut self, key: &str, value: f64) {
        self.push_key(key);
        let _ = write!(self.buf, "{value}");
    }

    fn emit_time(&mut self, key: &str, value: DateTime<Utc>) {
        self.push_key(key);
        self.buf.push_str(&value.to_rfc3339());
    }

    fn emit_duration(&mut self, key: &str, value: Duration) {
        self.push_key(key);
        let _ = write!(self.buf, "{value:?}");
    }

    fn open_group(&mut self, key: &str) {
        self.prefix.push(key.to_string());
    }

    fn close_group(&mut self) {
        self.prefix.pop();
    }
}

/// Translate fields into the keyed JSON object form.
pub fn fields_to_json(fields: &[Field]) -> serde_json::Map<String, serde_json::Value> {
    let mut encoder = JsonEncoder::new();
    encode_fields(fields, &mut encoder);
    encoder.finish()
}

/// Translate fields into the text segment form.
pub fn fields_to_text(fields: &[Field]) -> String {
    let mut encoder = TextEncoder::new();
    encode_fields(fields, &mut encoder);
    encoder.finish()
}
