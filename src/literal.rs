//! List and map literals exchanged with the language model
//!
//! Prompts embed candidate lists and definition maps as bracketed literals
//! (`['no cap', "that's"]`, `{'drip': 'style'}`) and the model is asked to
//! answer in the same list shape. Responses are parsed with a small grammar:
//!
//! ```text
//! response := '[' items? ']' | items
//! items    := term (',' term)*
//! term     := quoted | bare
//! quoted   := ("'" | '"') char* matching-quote      backslash escapes the next char
//! bare     := any chars except ','
//! ```
//!
//! Terms are trimmed and empty terms are dropped. When the response does not
//! fit the grammar (an unterminated quote, or stray text after a closing quote)
//! parsing falls back to splitting on commas and stripping quote characters
//! from both ends of each piece. The fallback never fails, it may only return
//! fewer or oddly split terms.

use indexmap::IndexMap;

/// Which parse path produced a term list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Strict,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTerms {
    pub terms: Vec<String>,
    pub mode: ParseMode,
}

/// Quote a string the way a list literal would show it
///
/// Single quotes are preferred; double quotes are used when the text contains
/// a single quote and no double quote.
pub fn quote(text: &str) -> String {
    let delimiter = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(delimiter);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

/// Render a sequence as `['a', 'b']`
pub fn render_list<S: AsRef<str>>(items: &[S]) -> String {
    let inner: Vec<String> = items.iter().map(|s| quote(s.as_ref())).collect();
    format!("[{}]", inner.join(", "))
}

/// Render a map as `{'k': 'v'}` preserving insertion order
pub fn render_map(map: &IndexMap<String, String>) -> String {
    let inner: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: {}", quote(k), quote(v)))
        .collect();
    format!("{{{}}}", inner.join(", "))
}

/// Parse a model response into a list of terms
pub fn parse_term_list(raw: &str) -> ParsedTerms {
    let body = strip_brackets(raw.trim());
    match parse_strict(body) {
        Some(terms) => ParsedTerms {
            terms,
            mode: ParseMode::Strict,
        },
        None => ParsedTerms {
            terms: parse_fallback(body),
            mode: ParseMode::Fallback,
        },
    }
}

fn strip_brackets(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('[') && text.ends_with(']') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

fn parse_strict(body: &str) -> Option<Vec<String>> {
    let mut terms = Vec::new();
    let mut chars = body.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let term = match chars.peek().copied() {
            None => break,
            Some(q @ ('\'' | '"')) => {
                chars.next();
                let mut term = String::new();
                loop {
                    match chars.next()? {
                        '\\' => match chars.next()? {
                            'n' => term.push('\n'),
                            't' => term.push('\t'),
                            other => term.push(other),
                        },
                        c if c == q => break,
                        c => term.push(c),
                    }
                }
                while chars.next_if(|c| c.is_whitespace()).is_some() {}
                match chars.peek() {
                    None | Some(',') => {}
                    Some(_) => return None,
                }
                term
            }
            Some(_) => {
                let mut term = String::new();
                while let Some(c) = chars.next_if(|&c| c != ',') {
                    term.push(c);
                }
                // stray quote on an otherwise bare term, as in `bussin'`
                term.trim()
                    .trim_matches(|c| c == '\'' || c == '"')
                    .to_string()
            }
        };

        if !term.trim().is_empty() {
            terms.push(term.trim().to_string());
        }

        if chars.next().is_none() {
            break;
        }
    }

    Some(terms)
}

fn parse_fallback(body: &str) -> Vec<String> {
    body.split(',')
        .map(|piece| piece.trim().trim_matches(|c| c == '\'' || c == '"'))
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}
