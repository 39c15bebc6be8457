//! Tokenizer for the dictionary grammar.

use crate::error::{DictError, DictResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    LBrace,
    RBrace,
    LParen,
    RParen,
    Semi,
    Word(String),
    Str(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub tok: Tok,
    pub offset: usize,
}

/// Undo `\\"` and `\\\\`; other backslash sequences are kept as written.
fn unescape_quoted(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next @ ('"' | '\\')) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Split `src` into tokens, dropping `//` and `/* */` comments.
///
/// A `(` that opens a token starts a list; inside a word (`div(phi,U)`)
/// parentheses belong to the word until they balance.
pub(crate) fn tokenize(src: &str) -> DictResult<Vec<Token>> {
    let bytes = src.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let start = i;
                i += 2;
                loop {
                    if i + 1 >= bytes.len() {
                        return Err(DictError::format(start, "unterminated block comment"));
                    }
                    if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            b'{' => {
                out.push(Token { tok: Tok::LBrace, offset: i });
                i += 1;
            }
            b'}' => {
                out.push(Token { tok: Tok::RBrace, offset: i });
                i += 1;
            }
            b'(' => {
                out.push(Token { tok: Tok::LParen, offset: i });
                i += 1;
            }
            b')' => {
                out.push(Token { tok: Tok::RParen, offset: i });
                i += 1;
            }
            b';' => {
                out.push(Token { tok: Tok::Semi, offset: i });
                i += 1;
            }
            b'"' => {
                let start = i;
                i += 1;
                let body_start = i;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(DictError::format(start, "unterminated string"));
                }
                out.push(Token {
                    tok: Tok::Str(unescape_quoted(&src[body_start..i])),
                    offset: start,
                });
                i += 1;
            }
            _ => {
                let start = i;
                let mut depth = 0usize;
                while i < bytes.len() {
                    match bytes[i] {
                        b' ' | b'\t' | b'\r' | b'\n' | b'{' | b'}' | b';' | b'"' => break,
                        b'(' => depth += 1,
                        b')' if depth == 0 => break,
                        b')' => depth -= 1,
                        b'/' if matches!(bytes.get(i + 1), Some(b'/') | Some(b'*')) => break,
                        _ => {}
                    }
                    i += 1;
                }
                out.push(Token {
                    tok: Tok::Word(src[start..i].to_string()),
                    offset: start,
                });
            }
        }
    }

    Ok(out)
}
