//! Recursive-descent parser over the token stream.

use crate::dictionary::Dictionary;
use crate::error::{DictError, DictResult};
use crate::token::{Tok, Token, tokenize};
use crate::value::{Value, scalar_from_word};

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
}

impl Parser {
    pub fn new(src: &str) -> DictResult<Self> {
        Ok(Self {
            tokens: tokenize(src)?,
            pos: 0,
            end: src.len(),
        })
    }

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + ahead).map(|t| &t.tok)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.offset)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Parse entries until end of input (`nested == false`) or a closing brace.
    pub fn entries(&mut self, nested: bool) -> DictResult<Dictionary> {
        let mut dict = Dictionary::new();
        loop {
            let offset = self.offset();
            let Some(tok) = self.next() else {
                if nested {
                    return Err(DictError::format(offset, "missing '}'"));
                }
                return Ok(dict);
            };
            match tok.tok {
                Tok::RBrace if nested => return Ok(dict),
                Tok::RBrace => return Err(DictError::format(offset, "unmatched '}'")),
                Tok::Semi => {}
                Tok::Word(key) if key.starts_with('#') => {
                    let value = match self.next() {
                        Some(Token {
                            tok: Tok::Word(w), ..
                        }) => Value::word(w),
                        Some(Token { tok: Tok::Str(s), .. }) => Value::string(s),
                        _ => {
                            return Err(DictError::format(
                                offset,
                                format!("directive '{key}' needs an argument"),
                            ));
                        }
                    };
                    dict.insert(key, value);
                }
                Tok::Word(key) => {
                    let value = self.entry_value()?;
                    dict.insert(key, value);
                }
                Tok::Str(key) => {
                    let value = self.entry_value()?;
                    dict.insert(format!("\"{key}\""), value);
                }
                Tok::LBrace | Tok::LParen | Tok::RParen => {
                    return Err(DictError::format(offset, "expected a keyword"));
                }
            }
        }
    }

    /// Value following a keyword: a `{}` block or items up to `;`.
    fn entry_value(&mut self) -> DictResult<Value> {
        if self.peek() == Some(&Tok::LBrace) {
            self.next();
            return Ok(Value::Dict(self.entries(true)?));
        }

        let mut items = Vec::new();
        loop {
            let offset = self.offset();
            let Some(tok) = self.next() else {
                return Err(DictError::format(offset, "missing ';'"));
            };
            match tok.tok {
                Tok::Semi => break,
                Tok::Word(w) => items.push(Value::Scalar(scalar_from_word(w))),
                Tok::Str(s) => items.push(Value::string(s)),
                Tok::LParen => items.push(self.list()?),
                Tok::LBrace => items.push(Value::Dict(self.entries(true)?)),
                Tok::RBrace | Tok::RParen => {
                    return Err(DictError::format(offset, "missing ';'"));
                }
            }
        }

        Ok(match items.len() {
            1 => items.remove(0),
            _ => Value::Tuple(items),
        })
    }

    /// List body after the opening parenthesis.
    pub fn list(&mut self) -> DictResult<Value> {
        let mut items = Vec::new();
        loop {
            let offset = self.offset();
            let Some(tok) = self.next() else {
                return Err(DictError::format(offset, "missing ')'"));
            };
            match tok.tok {
                Tok::RParen => break,
                Tok::Semi => {}
                Tok::Word(w) if self.peek() == Some(&Tok::LBrace) => {
                    self.next();
                    let body = self.entries(true)?;
                    items.push(Value::Tuple(vec![Value::word(w), Value::Dict(body)]));
                }
                Tok::Word(w) => items.push(Value::Scalar(scalar_from_word(w))),
                Tok::Str(s) => items.push(Value::string(s)),
                Tok::LParen => items.push(self.list()?),
                Tok::LBrace => items.push(Value::Dict(self.entries(true)?)),
                Tok::RBrace => return Err(DictError::format(offset, "missing ')'")),
            }
        }
        Ok(if items.is_empty() {
            Value::List(items)
        } else {
            Value::list(items)
        })
    }

    /// Parse a leading `FoamFile { ... }` block if one is present.
    pub fn header_block(&mut self) -> DictResult<Option<(Dictionary, usize)>> {
        let is_header = matches!(self.peek(), Some(Tok::Word(w)) if w == "FoamFile")
            && self.peek_at(1) == Some(&Tok::LBrace);
        if !is_header {
            return Ok(None);
        }
        let offset = self.offset();
        self.next();
        self.next();
        Ok(Some((self.entries(true)?, offset)))
    }

    /// Body of a `polyMesh/boundary` file: an optional count followed by a
    /// parenthesised list of `name { ... }` patches.
    pub fn patch_list(&mut self) -> DictResult<Vec<(String, Dictionary)>> {
        let count_offset = self.offset();
        let declared = match self.peek() {
            Some(Tok::Word(w)) => {
                let n = w.parse::<usize>().map_err(|_| {
                    DictError::format(count_offset, format!("expected patch count, found '{w}'"))
                })?;
                self.next();
                Some(n)
            }
            _ => None,
        };

        let offset = self.offset();
        if self.next().map(|t| t.tok) != Some(Tok::LParen) {
            return Err(DictError::format(offset, "expected '(' to open patch list"));
        }

        let mut patches = Vec::new();
        loop {
            let offset = self.offset();
            match self.next().map(|t| t.tok) {
                Some(Tok::RParen) => break,
                Some(Tok::Word(name)) => {
                    let offset = self.offset();
                    if self.next().map(|t| t.tok) != Some(Tok::LBrace) {
                        return Err(DictError::format(
                            offset,
                            format!("expected '{{' after patch '{name}'"),
                        ));
                    }
                    patches.push((name, self.entries(true)?));
                }
                Some(_) => return Err(DictError::format(offset, "expected patch name")),
                None => return Err(DictError::format(offset, "missing ')'")),
            }
        }

        if let Some(n) = declared {
            if n != patches.len() {
                tracing::warn!(
                    declared = n,
                    found = patches.len(),
                    "boundary patch count does not match entries"
                );
            }
        }
        Ok(patches)
    }
}
