//! Stack-based bracket balance scan.
//!
//! Single left-to-right pass over the bytes. String literals (`'`, `"`, and backtick
//! template strings, with backslash escapes) and comments (`//` and `/* */`) are skipped
//! so brackets inside them never touch the stack. All delimiters are ASCII, so walking
//! bytes is safe for UTF-8 input.

use super::{ErrorKind, ValidationError};

fn closer_for(opener: u8) -> u8 {
    match opener {
        b'(' => b')',
        b'[' => b']',
        _ => b'}',
    }
}

fn describe(ch: u8) -> &'static str {
    match ch {
        b'(' => "opening parenthesis '('",
        b')' => "closing parenthesis ')'",
        b'[' => "opening bracket '['",
        b']' => "closing bracket ']'",
        b'{' => "opening brace '{'",
        _ => "closing brace '}'",
    }
}

pub(super) fn check_brackets(code: &str) -> Vec<ValidationError> {
    let bytes = code.as_bytes();
    let len = bytes.len();
    let mut errors = Vec::new();
    // (opener, line)
    let mut stack: Vec<(u8, usize)> = Vec::new();
    let mut line = 1usize;
    let mut i = 0usize;

    while i < len {
        let ch = bytes[i];
        match ch {
            b'\n' => {
                line += 1;
                i += 1;
            }
            b'\'' | b'"' | b'`' => {
                i += 1;
                while i < len {
                    match bytes[i] {
                        b'\\' if i + 1 < len => {
                            if bytes[i + 1] == b'\n' {
                                line += 1;
                            }
                            i += 2;
                        }
                        b if b == ch => {
                            i += 1;
                            break;
                        }
                        b => {
                            if b == b'\n' {
                                line += 1;
                            }
                            i += 1;
                        }
                    }
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < len {
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        i += 2;
                        break;
                    }
                    if bytes[i] == b'\n' {
                        line += 1;
                    }
                    i += 1;
                }
            }
            b'(' | b'[' | b'{' => {
                stack.push((ch, line));
                i += 1;
            }
            b')' | b']' | b'}' => {
                match stack.last() {
                    None => errors.push(ValidationError::new(
                        ErrorKind::UnbalancedBrackets,
                        format!(
                            "Unexpected {} on line {line} with no matching opener. \
                             Remove it or add the missing opener.",
                            describe(ch)
                        ),
                    )),
                    Some(&(opener, opened_at)) if closer_for(opener) != ch => {
                        errors.push(ValidationError::new(
                            ErrorKind::UnbalancedBrackets,
                            format!(
                                "Mismatched brackets: {} on line {line} does not match \
                                 the {} opened on line {opened_at}.",
                                describe(ch),
                                describe(opener)
                            ),
                        ));
                        // Consume the opener so one slip does not cascade.
                        stack.pop();
                    }
                    Some(_) => {
                        stack.pop();
                    }
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    for (opener, opened_at) in stack {
        errors.push(ValidationError::new(
            ErrorKind::UnbalancedBrackets,
            format!(
                "Unclosed {} opened on line {opened_at}; missing '{}'.",
                describe(opener),
                closer_for(opener) as char
            ),
        ));
    }

    errors
}
