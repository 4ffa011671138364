//! Typed attribute values
//!
//! Every public object kind exposes a string get/set attribute interface
//! (the construction/attribute ABI). Internally attribute values are typed;
//! this module provides the value enum, string parsing per expected type,
//! and the canonical text formatting shared by the channel encodings.
//!
//! Formatting is round-trip exact: floats are written in Rust's shortest
//! form that re-parses to the identical bits, with a `.0` appended when the
//! result would otherwise be lexically indistinguishable from an integer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WcsError;
use crate::Result;

/// Expected type of an attribute, used to parse incoming strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrKind {
    Int,
    Float,
    Bool,
    Str,
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl AttrValue {
    /// Parse a string into the given attribute kind
    ///
    /// Booleans accept `0`/`1`/`true`/`false` (case-insensitive); the
    /// numeric forms are what the channel encodings emit.
    pub fn parse(name: &str, kind: AttrKind, value: &str) -> Result<AttrValue> {
        let value = value.trim();
        match kind {
            AttrKind::Int => value
                .parse::<i64>()
                .map(AttrValue::Int)
                .map_err(|_| WcsError::bad_attr_value(name, format!("`{value}` is not an integer"))),
            AttrKind::Float => value
                .parse::<f64>()
                .map(AttrValue::Float)
                .map_err(|_| WcsError::bad_attr_value(name, format!("`{value}` is not a number"))),
            AttrKind::Bool => match value {
                "1" => Ok(AttrValue::Bool(true)),
                "0" => Ok(AttrValue::Bool(false)),
                _ if value.eq_ignore_ascii_case("true") => Ok(AttrValue::Bool(true)),
                _ if value.eq_ignore_ascii_case("false") => Ok(AttrValue::Bool(false)),
                _ => Err(WcsError::bad_attr_value(
                    name,
                    format!("`{value}` is not a boolean (expected 0/1)"),
                )),
            },
            AttrKind::Str => Ok(AttrValue::Str(value.to_string())),
        }
    }

    /// The kind of this value
    pub fn kind(&self) -> AttrKind {
        match self {
            AttrValue::Int(_) => AttrKind::Int,
            AttrValue::Float(_) => AttrKind::Float,
            AttrValue::Bool(_) => AttrKind::Bool,
            AttrValue::Str(_) => AttrKind::Str,
        }
    }

    /// Get as integer, if the value is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as float; integers widen
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as bool, accepting the numeric encoding too
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            AttrValue::Int(0) => Some(false),
            AttrValue::Int(1) => Some(true),
            _ => None,
        }
    }

    /// Get as string slice, if the value is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", format_float(*v)),
            AttrValue::Bool(v) => write!(f, "{}", if *v { 1 } else { 0 }),
            AttrValue::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

/// Format a float so that it re-parses to identical bits and is lexically
/// distinct from an integer (always carries a `.`, an exponent, or a
/// non-numeric form such as `inf`/`NaN`).
pub fn format_float(v: f64) -> String {
    let mut s = format!("{}", v);
    let integral = s.chars().all(|c| c.is_ascii_digit() || c == '-');
    if integral {
        s.push_str(".0");
    }
    s
}

/// Helper for indexed attribute names such as `Label(2)`
///
/// Returns the base name and the 1-based axis index when the name ends in
/// a parenthesized integer.
pub fn split_indexed(name: &str) -> Option<(&str, usize)> {
    let open = name.find('(')?;
    let close = name.rfind(')')?;
    if close != name.len() - 1 || close <= open + 1 {
        return None;
    }
    let index: usize = name[open + 1..close].parse().ok()?;
    if index == 0 {
        return None;
    }
    Some((&name[..open], index))
}
