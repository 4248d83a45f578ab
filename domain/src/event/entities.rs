//! The captured event entity.

use super::context::{Context, ContextValue};
use super::value_objects::{Level, Source};
use crate::core::clock;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One record of captured output.
///
/// Immutable once built: fields are private and only the consuming
/// [`with_context`](Self::with_context) builder exists.
///
/// The serde representation is the line-delimited JSON record: `timestamp`,
/// `level`, `source`, `message` in that order, followed by the context
/// entries flattened as top-level keys.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    timestamp: DateTime<Utc>,
    level: Level,
    source: Source,
    message: String,
    context: Context,
}

impl LogEvent {
    /// Create an event stamped with the process capture clock.
    pub fn new(source: Source, level: Level, message: impl Into<String>) -> Self {
        Self::at(clock::now(), source, level, message)
    }

    /// Create an event with an explicit timestamp.
    pub fn at(
        timestamp: DateTime<Utc>,
        source: Source,
        level: Level,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            level,
            source,
            message: message.into(),
            context: Context::new(),
        }
    }

    /// Raw stream capture (level is always UNSET).
    pub fn from_stream(source: Source, message: impl Into<String>) -> Self {
        Self::new(source, Level::Unset, message)
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// ISO-8601 timestamp as written to every output format.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl Serialize for LogEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(4 + self.context.len()))?;
        map.serialize_entry("timestamp", &self.timestamp_string())?;
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry("source", &self.source)?;
        map.serialize_entry("message", &self.message)?;
        for (key, value) in self.context.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LogEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(LogEventVisitor)
    }
}

struct LogEventVisitor;

impl<'de> Visitor<'de> for LogEventVisitor {
    type Value = LogEvent;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a log record object")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut timestamp: Option<DateTime<Utc>> = None;
        let mut level: Option<Level> = None;
        let mut source: Option<Source> = None;
        let mut message: Option<String> = None;
        let mut context = Context::new();

        while let Some(key) = access.next_key::<String>()? {
            match key.as_str() {
                "timestamp" => {
                    let raw: String = access.next_value()?;
                    let parsed = DateTime::parse_from_rfc3339(&raw).map_err(de::Error::custom)?;
                    timestamp = Some(parsed.with_timezone(&Utc));
                }
                "level" => level = Some(access.next_value()?),
                "source" => source = Some(access.next_value()?),
                "message" => message = Some(access.next_value()?),
                _ => {
                    let value: ContextValue = access.next_value()?;
                    context.insert(key, value).map_err(de::Error::custom)?;
                }
            }
        }

        Ok(LogEvent {
            timestamp: timestamp.ok_or_else(|| de::Error::missing_field("timestamp"))?,
            level: level.unwrap_or(Level::Unset),
            source: source.ok_or_else(|| de::Error::missing_field("source"))?,
            message: message.ok_or_else(|| de::Error::missing_field("message"))?,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap()
            + chrono::Duration::microseconds(123_456)
    }

    #[test]
    fn test_serialize_field_order() {
        let event = LogEvent::at(fixed_time(), Source::Stdout, Level::Info, "hello");
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"timestamp":"2024-05-01T12:30:45.123456Z","level":"INFO","source":"STDOUT","message":"hello"}"#
        );
    }

    #[test]
    fn test_context_is_flattened_after_message() {
        let context = Context::new().with("user", "ada").with("attempt", 2);
        let event = LogEvent::at(fixed_time(), Source::Logger, Level::Error, "boom")
            .with_context(context);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.ends_with(r#""message":"boom","user":"ada","attempt":2}"#));
    }

    #[test]
    fn test_json_roundtrip_preserves_every_field() {
        let context = Context::new()
            .with("thread", "worker-1")
            .with("line", 42)
            .with("ratio", 0.5)
            .with("ok", false);
        let event = LogEvent::at(
            fixed_time(),
            Source::Stderr,
            Level::Warning,
            "multi\nline \"quoted\"",
        )
        .with_context(context);

        let json = serde_json::to_string(&event).unwrap();
        let parsed: LogEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_deserialize_requires_timestamp_and_source() {
        let missing_ts = r#"{"level":"INFO","source":"STDOUT","message":"x"}"#;
        assert!(serde_json::from_str::<LogEvent>(missing_ts).is_err());

        let missing_source = r#"{"timestamp":"2024-05-01T12:30:45Z","message":"x"}"#;
        assert!(serde_json::from_str::<LogEvent>(missing_source).is_err());
    }

    #[test]
    fn test_empty_message_is_allowed() {
        let event = LogEvent::at(fixed_time(), Source::Stdout, Level::Unset, "");
        let parsed: LogEvent = serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(parsed.message(), "");
    }

    #[test]
    fn test_from_stream_is_unset() {
        let event = LogEvent::from_stream(Source::Stdout, "raw");
        assert!(event.level().is_unset());
        assert_eq!(event.source(), Source::Stdout);
    }
}
