//! logfmt encoding.
//!
//! One record per line: `ts=... level=... source=... msg=...` followed by
//! context keys in insertion order. A value is double-quoted when it is
//! empty or contains whitespace, `=`, `"` or a control character; inside
//! quotes `\`, `"`, newlines, carriage returns and tabs are escaped so the
//! record never spans lines.

use livelog_domain::{ContextValue, LogEvent};
use std::fmt::Write as _;

/// Append one logfmt record (without the trailing newline) to `buf`.
pub fn encode(event: &LogEvent, buf: &mut String) {
    write_pair(buf, "ts", &event.timestamp_string());
    buf.push(' ');
    write_pair(buf, "level", event.level().as_str());
    buf.push(' ');
    write_pair(buf, "source", event.source().as_str());
    buf.push(' ');
    write_pair(buf, "msg", event.message());

    for (key, value) in event.context().iter() {
        buf.push(' ');
        match value {
            ContextValue::Str(s) => write_pair(buf, key, s),
            other => write_pair(buf, key, &other.to_string()),
        }
    }
}

fn write_pair(buf: &mut String, key: &str, value: &str) {
    write_key(buf, key);
    buf.push('=');
    write_value(buf, value);
}

fn write_key(buf: &mut String, key: &str) {
    if key.is_empty() {
        buf.push('_');
        return;
    }
    for c in key.chars() {
        if c.is_whitespace() || c == '=' || c == '"' || c.is_control() {
            buf.push('_');
        } else {
            buf.push(c);
        }
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '=' || c == '"' || c.is_control())
}

fn write_value(buf: &mut String, value: &str) {
    if !needs_quoting(value) {
        buf.push_str(value);
        return;
    }

    buf.push('"');
    for c in value.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c => buf.push(c),
        }
    }
    buf.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use livelog_domain::{Context, Level, Source};

    fn event(message: &str) -> LogEvent {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        LogEvent::at(ts, Source::Stdout, Level::Info, message)
    }

    fn render(event: &LogEvent) -> String {
        let mut buf = String::new();
        encode(event, &mut buf);
        buf
    }

    #[test]
    fn test_hello_scenario() {
        assert_eq!(
            render(&event("hello")),
            "ts=2025-01-02T03:04:05.000000Z level=INFO source=STDOUT msg=hello"
        );
    }

    #[test]
    fn test_whitespace_and_equals_are_quoted() {
        assert!(render(&event("hello world")).ends_with(r#"msg="hello world""#));
        assert!(render(&event("a=b")).ends_with(r#"msg="a=b""#));
        assert!(render(&event("")).ends_with(r#"msg="""#));
    }

    #[test]
    fn test_escapes_inside_quotes() {
        let line = render(&event("say \"hi\"\nthen\\leave"));
        assert!(line.ends_with(r#"msg="say \"hi\"\nthen\\leave""#));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_unquoted_backslash_is_left_alone() {
        assert!(render(&event(r"C:\temp")).ends_with(r"msg=C:\temp"));
    }

    #[test]
    fn test_context_keys_follow_in_order() {
        let context = Context::new()
            .with("user", "ada lovelace")
            .with("attempt", 2)
            .with("ok", true)
            .with("bad key", "x");
        let line = render(&event("done").with_context(context));
        assert!(line.ends_with(r#"msg=done user="ada lovelace" attempt=2 ok=true bad_key=x"#));
    }

    #[test]
    fn test_unset_level_is_rendered() {
        let line = render(&LogEvent::at(
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            Source::Stderr,
            Level::Unset,
            "raw",
        ));
        assert_eq!(
            line,
            "ts=2025-01-02T03:04:05.000000Z level=UNSET source=STDERR msg=raw"
        );
    }
}
