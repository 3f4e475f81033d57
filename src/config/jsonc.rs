//! JSON-with-comments preprocessing.
//!
//! The sync specification file allows `//` and `/* */` comments. This module
//! blanks them out (string-aware) so the document can be handed to
//! [`serde_json`] unchanged. Comment bytes are replaced with spaces rather
//! than removed, preserving line and column numbers in parse diagnostics.

/// Replace `//` line comments and `/* */` block comments with spaces.
///
/// Comment markers inside string literals are left untouched. Newlines
/// inside block comments are preserved.
#[must_use]
pub fn strip_comments(input: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Normal,
        InString,
        StringEscape,
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(input.len());
    let mut state = State::Normal;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Normal => match c {
                '"' => {
                    state = State::InString;
                    out.push(c);
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                    out.push_str("  ");
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                    out.push_str("  ");
                }
                _ => out.push(c),
            },
            State::InString => {
                out.push(c);
                match c {
                    '\\' => state = State::StringEscape,
                    '"' => state = State::Normal,
                    _ => {}
                }
            }
            State::StringEscape => {
                out.push(c);
                state = State::InString;
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Normal;
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Normal;
                    out.push_str("  ");
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
        }
    }

    out
}
