//! The command-line file format read by Chromium-based apps at startup.
//!
//! The file holds one line: a placeholder program name (`_`) followed by the
//! flags. Values containing whitespace or quotes are double-quoted.

use log::warn;

/// Placeholder for argv[0]; the consumer skips the first token
pub const PROGRAM_NAME: &str = "_";

/// Render a flag list as file contents
pub fn serialize(flags: &[String]) -> String {
    let mut line = String::from(PROGRAM_NAME);
    for flag in flags {
        line.push(' ');
        line.push_str(&quote_flag(flag));
    }
    line.push('\n');
    line
}

/// Parse file contents into a flag list, dropping the program name
pub fn parse(contents: &str) -> Vec<String> {
    let mut tokens = tokenize(contents);
    if !tokens.is_empty() {
        tokens.remove(0);
    }
    tokens
}

/// Quote the value part of `--name=value` when the tokenizer would split it
///
/// A flag without `=` that needs quoting is quoted as a whole token.
pub fn quote_flag(flag: &str) -> String {
    match flag.split_once('=') {
        Some((name, value)) if needs_quotes(value) => format!("{}={}", name, quoted(value)),
        None if needs_quotes(flag) => quoted(flag),
        _ => flag.to_string(),
    }
}

fn needs_quotes(s: &str) -> bool {
    s.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'')
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

/// Split a command line the way the consuming app does
///
/// A quote character opens a block that only the same character closes. A
/// backslash directly before a quote character is replaced by that quote,
/// which is then taken literally. Whitespace outside quotes ends a token.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current: Option<String> = None;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        let is_quote_boundary = match quote {
            None => c == '"' || c == '\'',
            Some(open) => c == open,
        };

        if is_quote_boundary {
            match current.as_mut() {
                Some(token) if token.ends_with('\\') => {
                    token.pop();
                    token.push(c);
                }
                _ => {
                    quote = match quote {
                        None => Some(c),
                        Some(_) => None,
                    };
                }
            }
        } else if quote.is_none() && c.is_whitespace() {
            if let Some(token) = current.take() {
                tokens.push(token);
            }
        } else {
            current.get_or_insert_with(String::new).push(c);
        }
    }

    if let Some(token) = current {
        if quote.is_some() {
            warn!("Unterminated quoted string in flag file: {}", token);
        }
        tokens.push(token);
    }

    tokens
}
