//! Dictionary values.

use core::fmt;

use crate::dictionary::Dictionary;
use crate::error::{DictError, DictResult};

/// Leaf value of a dictionary entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    Bool(bool),
    /// Bare token such as `simpleFoam`, `$internalField` or `div(phi,U)`.
    Word(String),
    /// Double-quoted string, stored without the quotes.
    Str(String),
}

/// Value of a dictionary entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    /// Parenthesised list whose items are all numbers. Never empty when
    /// parsed: `()` reads as an empty `List`.
    Vector(Vec<f64>),
    Dict(Dictionary),
    /// Parenthesised list of anything else.
    List(Vec<Value>),
    /// Several space-separated items in one entry, e.g. `uniform (0 0 0)`
    /// or `bounded Gauss linearUpwind grad(U)`.
    Tuple(Vec<Value>),
}

impl Value {
    pub fn number(v: f64) -> Self {
        Value::Scalar(Scalar::Number(v))
    }

    pub fn word(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Word(s.into()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Str(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }

    /// Numeric list. An empty one becomes an empty `List`, the way `()`
    /// parses back.
    pub fn vector(v: impl Into<Vec<f64>>) -> Self {
        let v = v.into();
        if v.is_empty() {
            Value::List(Vec::new())
        } else {
            Value::Vector(v)
        }
    }

    /// Build a list, collapsing all-number lists into a `Vector`.
    pub fn list(items: Vec<Value>) -> Self {
        let numbers: Option<Vec<f64>> = items.iter().map(Value::as_number).collect();
        match numbers {
            Some(v) if !v.is_empty() => Value::Vector(v),
            _ => Value::List(items),
        }
    }

    /// Build an entry from space separated tokens, classified the way the
    /// parser would read them back.
    pub fn words(text: &str) -> Self {
        let mut items: Vec<Value> = text
            .split_whitespace()
            .map(|w| Value::Scalar(scalar_from_word(w.to_string())))
            .collect();
        if items.len() == 1 {
            items.remove(0)
        } else {
            Value::Tuple(items)
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Scalar(Scalar::Number(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::Word(s)) | Value::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    /// True when the value would serialize to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Scalar(Scalar::Word(s)) => s.is_empty(),
            Value::Tuple(items) => items.is_empty(),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::number(v as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::words(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::words(&s)
    }
}

impl From<Dictionary> for Value {
    fn from(d: Dictionary) -> Self {
        Value::Dict(d)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Value::Vector(v.to_vec())
    }
}

/// `uniform <v>` field value for a scalar.
pub fn uniform_scalar(v: f64) -> Value {
    Value::Tuple(vec![Value::word("uniform"), Value::number(v)])
}

/// `uniform (x y z)` field value for a vector.
pub fn uniform_vector(v: &[f64]) -> Value {
    Value::Tuple(vec![Value::word("uniform"), Value::Vector(v.to_vec())])
}

/// Format a field value the way `internalField` and `value` entries expect.
///
/// Numbers and words become `uniform v`; three-component sequences become
/// `uniform (x y z)`. Any other shape is rejected.
pub fn format_uniform(value: &Value) -> DictResult<Value> {
    match value {
        Value::Scalar(Scalar::Number(v)) => Ok(uniform_scalar(*v)),
        Value::Scalar(s @ (Scalar::Word(_) | Scalar::Str(_))) => Ok(Value::Tuple(vec![
            Value::word("uniform"),
            Value::Scalar(s.clone()),
        ])),
        Value::Vector(v) if v.len() == 3 => Ok(uniform_vector(v)),
        other => Err(DictError::InvalidValue {
            value: other.to_string(),
            reason: "expected a scalar or a 3-vector".to_string(),
        }),
    }
}

/// Classify a bare token as a bool, a number, or a word.
pub(crate) fn scalar_from_word(w: String) -> Scalar {
    match w.as_str() {
        "on" | "true" | "yes" => return Scalar::Bool(true),
        "off" | "false" | "no" => return Scalar::Bool(false),
        _ => {}
    }
    let numeric_start = w
        .as_bytes()
        .first()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, b'-' | b'+' | b'.'));
    if numeric_start {
        if let Ok(v) = w.parse::<f64>() {
            if v.is_finite() {
                return Scalar::Number(v);
            }
        }
    }
    Scalar::Word(w)
}

/// Escape `"` and any backslash the tokenizer would read as an escape.
pub(crate) fn escape_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' if matches!(chars.peek(), None | Some('"') | Some('\\')) => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}

pub(crate) fn format_number(v: f64) -> String {
    format!("{v}")
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(v) => f.write_str(&format_number(*v)),
            Scalar::Bool(true) => f.write_str("on"),
            Scalar::Bool(false) => f.write_str("off"),
            Scalar::Word(s) => f.write_str(s),
            Scalar::Str(s) => write!(f, "\"{}\"", escape_quoted(s)),
        }
    }
}

/// Single-line rendering, used for change detection and inline entries.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{s}"),
            Value::Vector(v) => {
                f.write_str("(")?;
                for (i, c) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    f.write_str(&format_number(*c))?;
                }
                f.write_str(")")
            }
            Value::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Value::Tuple(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Dict(d) => {
                f.write_str("{")?;
                for (key, value) in d.iter() {
                    write!(f, " {key} {value};")?;
                }
                f.write_str(" }")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_formats() {
        assert_eq!(uniform_scalar(0.0).to_string(), "uniform 0");
        assert_eq!(
            uniform_vector(&[1.0, 0.0, 0.5]).to_string(),
            "uniform (1 0 0.5)"
        );
        assert!(format_uniform(&Value::Vector(vec![1.0, 2.0])).is_err());
        assert_eq!(
            format_uniform(&Value::number(300.0)).unwrap().to_string(),
            "uniform 300"
        );
    }

    #[test]
    fn list_collapses_numbers() {
        let v = Value::list(vec![Value::number(1.0), Value::number(2.0)]);
        assert_eq!(v, Value::Vector(vec![1.0, 2.0]));
        let mixed = Value::list(vec![Value::word("a"), Value::number(2.0)]);
        assert!(matches!(mixed, Value::List(_)));
    }

    #[test]
    fn words_split_into_tuple() {
        assert_eq!(Value::words("Gauss linear").to_string(), "Gauss linear");
        assert_eq!(Value::words("simpleFoam"), Value::word("simpleFoam"));
    }

    #[test]
    fn bool_renders_on_off() {
        assert_eq!(Value::boolean(true).to_string(), "on");
        assert_eq!(Value::boolean(false).to_string(), "off");
    }
}
