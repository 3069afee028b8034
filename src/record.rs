use chrono::{DateTime, Utc};

use crate::encode::{fields_to_json, fields_to_text};
use crate::field::Field;
use crate::level::{Format, Level};

/// A single normalized log event on its way to the sinks, carrying the field
/// payload in both translated forms.
#[derive(Debug, Clone)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub caller: Option<String>,
    pub fields_json: serde_json::Map<String, serde_json::Value>,
    pub fields_text: String,
}

impl Record {
    /// Build a record by translating `fields` into both sink forms.
    pub fn from_fields(
        level: Level,
        message: impl Into<String>,
        caller: Option<String>,
        fields: &[Field],
    ) -> Record {
        Record {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            caller,
            fields_json: fields_to_json(fields),
            fields_text: fields_to_text(fields),
        }
    }

    /// Build a record from already-translated field forms, e.g. the primed
    /// snapshots a logger keeps per [`with_fields`](crate::Logger::with_fields).
    pub fn from_parts(
        level: Level,
        message: impl Into<String>,
        caller: Option<String>,
        fields_json: serde_json::Map<String, serde_json::Value>,
        fields_text: String,
    ) -> Record {
        Record {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            caller,
            fields_json,
            fields_text,
        }
    }

    /// Render one line, including the trailing newline, in the given format.
    pub fn render(&self, format: Format) -> String {
        match format {
            Format::Json => self.render_json(),
            Format::Text => self.render_text(),
        }
    }

    fn render_json(&self) -> String {
        let mut object = serde_json::Map::new();
        object.insert(
            "timestamp".to_string(),
            serde_json::Value::String(self.timestamp.to_rfc3339()),
        );
        object.insert(
            "level".to_string(),
            serde_json::Value::String(self.level.as_str().to_string()),
        );
        object.insert(
            "message".to_string(),
            serde_json::Value::String(self.message.clone()),
        );
        if let Some(caller) = &self.caller {
            object.insert("caller".to_string(), serde_json::Value::String(caller.clone()));
        }
        for (key, value) in &self.fields_json {
            object.insert(key.clone(), value.clone());
        }

        let mut line = serde_json::Value::Object(object).to_string();
        line.push('\n');
        line
    }

    fn render_text(&self) -> String {
        let mut line = format!(
            "{} {:>5} {}",
            self.timestamp.to_rfc3339(),
            self.level.as_str(),
            self.message
        );
        if !self.fields_text.is_empty() {
            line.push(' ');
            line.push_str(&self.fields_text);
        }
        if let Some(caller) = &self.caller {
            line.push_str(" caller=");
            line.push_str(caller);
        }
        line.push('\n');
        line
    }
}
