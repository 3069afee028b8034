use std::fmt;

/// Severity of a log message. Ordered so that `Debug < Info < Warn < Error`;
/// a sink passes a message whose level is at or above its minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a configured level string.
///
/// Matching is case-sensitive on `DEBUG`/`INFO`/`WARN`/`ERROR`; anything
/// unrecognized falls back to `INFO` rather than failing construction.
pub fn parse_level(level: &str) -> Level {
    match level {
        "DEBUG" => Level::Debug,
        "INFO" => Level::Info,
        "WARN" => Level::Warn,
        "ERROR" => Level::Error,
        _ => Level::Info,
    }
}

/// Record rendering for a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Text,
}

/// Resolve a configured formatter string: `JSON` selects the JSON renderer,
/// anything else the plain text one.
pub fn parse_format(formatter: &str) -> Format {
    match formatter {
        "JSON" => Format::Json,
        _ => Format::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_levels_parse_exactly() {
        assert_eq!(parse_level("DEBUG"), Level::Debug);
        assert_eq!(parse_level("INFO"), Level::Info);
        assert_eq!(parse_level("WARN"), Level::Warn);
        assert_eq!(parse_level("ERROR"), Level::Error);
    }

    #[test]
    fn unrecognized_levels_fall_back_to_info() {
        assert_eq!(parse_level("TRACE"), Level::Info);
        assert_eq!(parse_level("info"), Level::Info);
        assert_eq!(parse_level(""), Level::Info);
    }

    #[test]
    fn severity_orders_debug_to_error() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn formatter_defaults_to_text() {
        assert_eq!(parse_format("JSON"), Format::Json);
        assert_eq!(parse_format("TEXT"), Format::Text);
        assert_eq!(parse_format("yaml"), Format::Text);
    }
}
