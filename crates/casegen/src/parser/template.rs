//! Locating the `#begin` / `#end` section of a template.

/// Marker line opening the generated section.
pub const BEGIN_MARKER: &str = "#begin";
/// Marker line closing the generated section.
pub const END_MARKER: &str = "#end";

/// One line of the active section, with its 1-based line number in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Seeking,
    Active,
    Done,
}

/// Collect the lines between `#begin` and `#end`.
///
/// Returns `None` when the template has no `#begin` marker. A missing `#end`
/// is fine: the section then runs to the end of the input. Marker lines are
/// matched ignoring trailing whitespace; `\n` and `\r\n` both end a line.
///
/// ```
/// use casegen::parser::active_lines;
///
/// let lines = active_lines("notes\n#begin\nn[int](1,5)\n#end\nmore").unwrap();
/// assert_eq!(lines.len(), 1);
/// assert_eq!(lines[0].number, 3);
/// assert!(active_lines("n[int](1,5)").is_none());
/// ```
pub fn active_lines(source: &str) -> Option<Vec<SourceLine<'_>>> {
    let mut state = State::Seeking;
    let mut lines = Vec::new();

    for (index, text) in source.lines().enumerate() {
        let marker = text.trim_end();
        match state {
            State::Seeking if marker == BEGIN_MARKER => state = State::Active,
            State::Seeking => {}
            State::Active if marker == END_MARKER => state = State::Done,
            State::Active => lines.push(SourceLine {
                number: index + 1,
                text,
            }),
            State::Done => break,
        }
    }

    (state != State::Seeking).then_some(lines)
}
