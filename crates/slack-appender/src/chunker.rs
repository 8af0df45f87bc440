// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Splits long text into bounded chunks, preferring line boundaries.
//!
//! Slack rejects attachment field values over roughly 2000 characters, and a
//! full error trace regularly exceeds that.

/// Returns an iterator over consecutive chunks of `text`, each at most
/// `max_chars` characters long.
///
/// When the remaining text does not fit, the chunk ends at the last line break
/// (`\r`, `\n` or `\r\n`) inside the limit and the break itself is dropped.
/// Without a usable break the text is cut at exactly `max_chars`.
///
/// ```
/// use slack_appender::chunker::chunks;
///
/// let parts: Vec<&str> = chunks("at a\nat b\nat c", 9).collect();
/// assert_eq!(parts, vec!["at a\nat b", "at c"]);
/// assert_eq!(chunks("", 10).count(), 0);
/// ```
#[must_use]
pub fn chunks(text: &str, max_chars: usize) -> Chunks<'_> {
    Chunks {
        rest: text,
        max_chars: max_chars.max(1),
    }
}

/// Iterator returned by [`chunks`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    max_chars: usize,
}

fn is_line_break(c: char) -> bool {
    c == '\r' || c == '\n'
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        // Byte offset of the first character past the limit.
        let Some((limit, next_char)) = self.rest.char_indices().nth(self.max_chars) else {
            let chunk = self.rest;
            self.rest = "";
            return Some(chunk);
        };

        // A break sitting right on the limit still lets the chunk fill up completely.
        let window = &self.rest[..limit + next_char.len_utf8()];
        if let Some(pos) = window.rfind(is_line_break).filter(|&pos| pos > 0) {
            let bytes = self.rest.as_bytes();
            let mut end = pos;
            let mut resume = pos + 1;
            if bytes[pos] == b'\n' && bytes[pos - 1] == b'\r' {
                end = pos - 1;
            } else if bytes[pos] == b'\r' && bytes.get(pos + 1) == Some(&b'\n') {
                resume = pos + 2;
            }

            if end > 0 {
                let chunk = &self.rest[..end];
                self.rest = &self.rest[resume..];
                return Some(chunk);
            }
        }

        let (chunk, rest) = self.rest.split_at(limit);
        self.rest = rest;
        Some(chunk)
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str, max_chars: usize) -> Vec<&str> {
        chunks(text, max_chars).collect()
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(collect("", 10).is_empty());
    }

    #[test]
    fn test_short_input_is_single_chunk() {
        assert_eq!(collect("at A\nat B", 1990), vec!["at A\nat B"]);
        assert_eq!(collect("exactly10!", 10), vec!["exactly10!"]);
    }

    #[test]
    fn test_hard_cut_without_line_breaks() {
        let text = "a".repeat(25);
        let parts = collect(&text, 10);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 10);
        assert_eq!(parts[1].len(), 10);
        assert_eq!(parts[2].len(), 5);
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_prefers_last_line_break() {
        assert_eq!(collect("one\ntwo\nthree", 9), vec!["one\ntwo", "three"]);
    }

    #[test]
    fn test_break_on_limit_fills_chunk() {
        assert_eq!(collect("0123456789\nabc", 10), vec!["0123456789", "abc"]);
    }

    #[test]
    fn test_crlf_consumed_as_single_break() {
        assert_eq!(collect("one\r\ntwo\r\nthree", 9), vec!["one\r\ntwo", "three"]);
        assert_eq!(collect("0123456789\r\nabc", 10), vec!["0123456789", "abc"]);
        assert_eq!(collect("012345678\r\nabc", 10), vec!["012345678", "abc"]);
    }

    #[test]
    fn test_lone_carriage_return_is_a_break() {
        assert_eq!(collect("one\rtwo\rthree", 9), vec!["one\rtwo", "three"]);
        // "\n\r" is two breaks, only the last one is consumed
        assert_eq!(collect("ab\n\rcdefg", 4), vec!["ab\n", "cdef", "g"]);
    }

    #[test]
    fn test_leading_break_falls_back_to_cut() {
        assert_eq!(collect("\nabcdefgh", 4), vec!["\nabc", "defg", "h"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "é".repeat(7);
        let parts = collect(&text, 3);
        assert_eq!(parts, vec!["ééé", "ééé", "é"]);
    }

    #[test]
    fn test_zero_max_is_treated_as_one() {
        assert_eq!(collect("abc", 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_round_trip_on_line_boundaries() {
        let text = (0..200)
            .map(|i| format!("   at Module.Function{i}() in /src/file.rs:line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let parts = collect(&text, 1990);

        assert!(parts.len() > 1);
        for part in &parts {
            assert!(part.chars().count() <= 1990);
            assert!(!part.is_empty());
        }
        assert_eq!(parts.join("\n"), text);
    }

    #[test]
    fn test_iterator_is_fused() {
        let mut iter = chunks("abc", 10);
        assert_eq!(iter.next(), Some("abc"));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }
}
