//! Cutting captured text into event-sized units.

use livelog_domain::LineSplit;

/// Split `text` into message units according to `mode`.
///
/// - An empty chunk yields nothing.
/// - `PerLine`: split on `\n`, strip one trailing `\r` per line; a single
///   trailing newline does not produce an extra empty unit, but blank lines
///   inside the chunk do.
/// - `WholeChunk`: one unit with one trailing line ending removed.
pub fn split_units(text: &str, mode: LineSplit) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }

    let body = strip_line_ending(text);
    match mode {
        LineSplit::PerLine => body
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect(),
        LineSplit::WholeChunk => vec![body],
    }
}

fn strip_line_ending(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_line_drops_single_trailing_newline() {
        assert_eq!(split_units("a\nb\n", LineSplit::PerLine), vec!["a", "b"]);
        assert_eq!(split_units("a\nb", LineSplit::PerLine), vec!["a", "b"]);
    }

    #[test]
    fn test_per_line_keeps_interior_blank_lines() {
        assert_eq!(
            split_units("a\n\nb\n", LineSplit::PerLine),
            vec!["a", "", "b"]
        );
        assert_eq!(split_units("\n", LineSplit::PerLine), vec![""]);
    }

    #[test]
    fn test_per_line_strips_crlf() {
        assert_eq!(
            split_units("one\r\ntwo\r\n", LineSplit::PerLine),
            vec!["one", "two"]
        );
    }

    #[test]
    fn test_whole_chunk_keeps_interior_newlines() {
        assert_eq!(
            split_units("a\nb\n", LineSplit::WholeChunk),
            vec!["a\nb"]
        );
    }

    #[test]
    fn test_empty_chunk_yields_nothing() {
        assert!(split_units("", LineSplit::PerLine).is_empty());
        assert!(split_units("", LineSplit::WholeChunk).is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let text: String = (0..100).map(|i| format!("line {}\n", i)).collect();
        let units = split_units(&text, LineSplit::PerLine);
        assert_eq!(units.len(), 100);
        for (i, unit) in units.iter().enumerate() {
            assert_eq!(*unit, format!("line {}", i));
        }
    }
}
