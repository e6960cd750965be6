//! Static code validator
//!
//! Performs a syntax-only check of snippet source before activation. The
//! check never executes the code: it is a line-aware scan for the errors
//! that reliably break an imperative snippet at parse time, namely
//! unterminated string literals, unterminated block comments, and
//! unbalanced bracket pairs.
//!
//! Only snippets of the `php` type family are validated; markup, style,
//! and script snippets are rendered verbatim and have nothing to gate.

use crate::errors::CodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    SingleQuote,
    DoubleQuote,
    LineComment,
    BlockComment,
}

/// Check snippet source for syntax errors.
///
/// Returns the first error found with a 1-based line number, or None if
/// the code scans clean. An empty string is always valid.
pub fn validate(code: &str) -> Option<CodeError> {
    let mut mode = Mode::Code;
    let mut line: u32 = 1;
    // Opening line of the current string or block comment
    let mut opened_at: u32 = 1;
    // Bracket stack: (character, opening line)
    let mut brackets: Vec<(char, u32)> = Vec::new();

    let mut chars = code.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\n' {
            line += 1;
            if mode == Mode::LineComment {
                mode = Mode::Code;
            }
            continue;
        }

        match mode {
            Mode::Code => match ch {
                '\'' => {
                    mode = Mode::SingleQuote;
                    opened_at = line;
                }
                '"' => {
                    mode = Mode::DoubleQuote;
                    opened_at = line;
                }
                '#' => mode = Mode::LineComment,
                '/' => {
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        mode = Mode::LineComment;
                    } else if chars.peek() == Some(&'*') {
                        chars.next();
                        mode = Mode::BlockComment;
                        opened_at = line;
                    }
                }
                '(' | '[' | '{' => brackets.push((ch, line)),
                ')' | ']' | '}' => {
                    let expected = match ch {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match brackets.pop() {
                        Some((open, _)) if open == expected => {}
                        Some((open, open_line)) => {
                            return Some(CodeError {
                                message: format!(
                                    "Mismatched '{}': expected match for '{}' opened on line {}",
                                    ch, open, open_line
                                ),
                                line,
                            });
                        }
                        None => {
                            return Some(CodeError {
                                message: format!("Unexpected '{}'", ch),
                                line,
                            });
                        }
                    }
                }
                _ => {}
            },
            Mode::SingleQuote | Mode::DoubleQuote => {
                let quote = if mode == Mode::SingleQuote { '\'' } else { '"' };
                if ch == '\\' {
                    // Escaped character, including an escaped quote
                    chars.next();
                } else if ch == quote {
                    mode = Mode::Code;
                }
            }
            Mode::LineComment => {}
            Mode::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Code;
                }
            }
        }
    }

    match mode {
        Mode::SingleQuote | Mode::DoubleQuote => {
            return Some(CodeError {
                message: "Unterminated string literal".to_string(),
                line: opened_at,
            });
        }
        Mode::BlockComment => {
            return Some(CodeError {
                message: "Unterminated block comment".to_string(),
                line: opened_at,
            });
        }
        Mode::Code | Mode::LineComment => {}
    }

    if let Some((open, open_line)) = brackets.pop() {
        return Some(CodeError {
            message: format!("Unclosed '{}'", open),
            line: open_line,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_code_passes() {
        assert_eq!(validate(""), None);
        assert_eq!(validate("echo 1;"), None);
        assert_eq!(validate("if (true) {\n    run();\n}\n"), None);
        assert_eq!(validate("$s = 'it\\'s fine';"), None);
        assert_eq!(validate("/* multi\nline */ do_thing();"), None);
        assert_eq!(validate("// trailing ( does not count\nok();"), None);
        assert_eq!(validate("# hash comment with }\nok();"), None);
    }

    #[test]
    fn test_unterminated_construct_detected() {
        let err = validate("<?php if(").unwrap();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("Unclosed '('"));

        let err = validate("echo 1;\n$s = \"oops;\n").unwrap();
        assert_eq!(err.message, "Unterminated string literal");
        assert_eq!(err.line, 2);

        let err = validate("run();\n/* never closed\nmore").unwrap();
        assert_eq!(err.message, "Unterminated block comment");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_bracket_mismatch_reports_first_error() {
        let err = validate("func(]\n)").unwrap();
        assert_eq!(err.line, 1);
        assert!(err.message.starts_with("Mismatched ']'"));

        let err = validate("ok();\n}").unwrap();
        assert_eq!(err.message, "Unexpected '}'");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_brackets_inside_strings_ignored() {
        assert_eq!(validate("echo \"unbalanced ( [ {\";"), None);
        assert_eq!(validate("echo '}';"), None);
    }
}
