//! Depth-aware scanning helpers over raw line text.
//!
//! Template lines embed expressions, so separators and parentheses only
//! count when they sit at the top level: not nested inside `()`/`[]`/`{}`
//! and, for splitting, not inside a quoted string.

use std::ops::Range;

/// Split `text` on `separator` occurrences that are not nested.
///
/// At most `max_splits` splits are performed when given; the remainder
/// stays in the last part. The parts are returned untrimmed.
///
/// ```
/// use casegen::parser::split_top_level;
///
/// assert_eq!(split_top_level("max(1,2), 5", ',', None), vec!["max(1,2)", " 5"]);
/// assert_eq!(split_top_level("a,b,c", ',', Some(1)), vec!["a", "b,c"]);
/// ```
pub fn split_top_level(text: &str, separator: char, max_splits: Option<usize>) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (index, c) in text.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ if c == separator && depth == 0 => {
                if max_splits.is_some_and(|max| parts.len() >= max) {
                    continue;
                }
                parts.push(&text[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Byte range of the last balanced top-level `(...)` group in `text`.
///
/// The range covers the group including its parentheses. Groups nested
/// inside another group belong to it; an unclosed group is ignored.
pub(crate) fn last_paren_group(text: &str) -> Option<Range<usize>> {
    let mut depth = 0_usize;
    let mut open_at = 0;
    let mut last = None;
    for (index, c) in text.char_indices() {
        match c {
            '(' => {
                if depth == 0 {
                    open_at = index;
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    last = Some(open_at..index + 1);
                }
            }
            _ => {}
        }
    }
    last
}

/// Byte index of the `]` matching the `[` at `open`.
pub(crate) fn matching_bracket(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0_usize;
    for (index, c) in text[open..].char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte indices of `marker` occurrences outside any `()`/`[]` nesting.
pub(crate) fn top_level_positions(text: &str, marker: char) -> Vec<usize> {
    let mut depth = 0_usize;
    let mut positions = Vec::new();
    for (index, c) in text.char_indices() {
        if c == marker && depth == 0 {
            positions.push(index);
        }
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    positions
}

/// Byte offset of `inner` within `outer`. `inner` must be a subslice.
pub(crate) fn offset_in(outer: &str, inner: &str) -> usize {
    inner.as_ptr() as usize - outer.as_ptr() as usize
}
