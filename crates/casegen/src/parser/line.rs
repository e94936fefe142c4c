//! Fragment extraction for a single template line.
//!
//! A declaration line conventionally reads `name[type]constraints@assertion@$suffix`.
//! Each fragment is located independently:
//!
//! - type: between the first `[` and its matching `]`
//! - name: the word immediately before that `[`
//! - assertion: between the first and the last `@` after the type
//! - constraint: the last top-level `(...)` group after the type
//! - suffix: whatever follows the last top-level `$` after the type

use std::ops::Range;

use super::escape::unescape;
use super::expr::is_ident_cont;
use super::scan::{last_paren_group, matching_bracket, offset_in, top_level_positions};

/// A piece of line text together with its byte span in the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub span: Range<usize>,
}

impl Fragment {
    fn within(line: &str, slice: &str) -> Self {
        let start = offset_in(line, slice);
        Fragment {
            text: slice.to_string(),
            span: start..start + slice.len(),
        }
    }
}

/// An `@...@` assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    /// `@expr@`: evaluated per element (with `i`/`j` bound) or as the scalar.
    Single(Fragment),
    /// `@@expr@@`: evaluated once to supply the whole collection.
    Double(Fragment),
}

impl Assertion {
    /// The expression fragment, whichever kind this is.
    pub fn fragment(&self) -> &Fragment {
        match self {
            Assertion::Single(fragment) | Assertion::Double(fragment) => fragment,
        }
    }
}

/// The fragments extracted from one template line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLine {
    /// Raw content of the type bracket, e.g. `intlist$ n`.
    pub declared_type: Option<Fragment>,
    /// The variable to bind the generated value to.
    pub variable_name: Option<Fragment>,
    pub assertion: Option<Assertion>,
    /// Content of the last top-level parenthesis group after the type.
    pub constraint: Option<Fragment>,
    /// Decoded suffix appended after the rendered value.
    pub suffix: String,
    /// Number of top-level `[` groups after the type bracket and outside
    /// the assertion; these are ambiguous.
    pub extra_brackets: usize,
}

/// Extract the fragments of a template line.
///
/// ```
/// use casegen::parser::parse_line;
///
/// let line = parse_line("n[int](1,10)$");
/// assert_eq!(line.variable_name.unwrap().text, "n");
/// assert_eq!(line.declared_type.unwrap().text, "int");
/// assert_eq!(line.constraint.unwrap().text, "1,10");
/// assert_eq!(line.suffix, "\n");
/// ```
pub fn parse_line(line: &str) -> TemplateLine {
    let type_bounds = line
        .find('[')
        .and_then(|open| matching_bracket(line, open).map(|close| (open, close)));

    let Some((open, close)) = type_bounds else {
        return TemplateLine {
            declared_type: None,
            variable_name: None,
            assertion: None,
            constraint: None,
            suffix: " ".to_string(),
            extra_brackets: 0,
        };
    };

    let type_text = &line[open + 1..close];
    let declared_type = (!type_text.trim().is_empty()).then(|| Fragment::within(line, type_text));
    let variable_name = variable_name(line, &line[..open]);

    let tail = &line[close + 1..];
    let at_bounds = at_bounds(tail);
    let assertion = at_bounds.and_then(|(first, last)| assertion(line, &tail[first + 1..last]));

    let outside = |index: usize| at_bounds.is_none_or(|(first, last)| index < first || index > last);
    let suffix_at = top_level_positions(tail, '$')
        .into_iter()
        .rev()
        .find(|&index| outside(index));
    let suffix = match suffix_at {
        None => " ".to_string(),
        Some(index) if index + 1 == tail.len() => "\n".to_string(),
        Some(index) => unescape(&tail[index + 1..]),
    };

    let region_end = [suffix_at, at_bounds.map(|(first, _)| first)]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(tail.len());
    let region = &tail[..region_end];
    let constraint = last_paren_group(region)
        .map(|group| Fragment::within(line, &region[group.start + 1..group.end - 1]));

    let extra_brackets = top_level_positions(tail, '[')
        .into_iter()
        .filter(|&index| outside(index))
        .count();

    TemplateLine {
        declared_type,
        variable_name,
        assertion,
        constraint,
        suffix,
        extra_brackets,
    }
}

/// The run of word characters that ends right before the type bracket.
fn variable_name(line: &str, prefix: &str) -> Option<Fragment> {
    let trimmed = prefix.trim_end();
    let word_start = trimmed
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_ident_cont(c))
        .last()
        .map(|(index, _)| index)?;
    Some(Fragment::within(line, &trimmed[word_start..]))
}

/// Positions of the first and last `@`, when they enclose at least one character.
fn at_bounds(tail: &str) -> Option<(usize, usize)> {
    let first = tail.find('@')?;
    let last = tail.rfind('@')?;
    (last > first + 1).then_some((first, last))
}

fn assertion(line: &str, content: &str) -> Option<Assertion> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.len() >= 2 && trimmed.starts_with('@') && trimmed.ends_with('@') {
        let inner = trimmed.trim_matches('@').trim();
        return (!inner.is_empty()).then(|| Assertion::Double(Fragment::within(line, inner)));
    }
    Some(Assertion::Single(Fragment::within(line, trimmed)))
}
