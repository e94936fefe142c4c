//! Backslash escape decoding shared by string literals and line suffixes.

/// Decode backslash escapes in `text`.
///
/// Recognised: `\n \t \r \0 \\ \' \" \a \b \f \v`, `\xHH` and `\uXXXX`.
/// An unknown or malformed escape is kept verbatim, backslash included.
///
/// ```
/// use casegen::parser::unescape;
///
/// assert_eq!(unescape(r"\t"), "\t");
/// assert_eq!(unescape(r"a\x41\q"), "aA\\q");
/// ```
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '\\' | '\'' | '"' => out.push(next),
            'x' | 'u' => {
                let width = if next == 'x' { 2 } else { 4 };
                let digits: String = chars.clone().take(width).collect();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        out.push(ch);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}
