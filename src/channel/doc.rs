//! Intermediate document representation for serialization
//!
//! Every encoding converts between objects and this tree: a class tag plus
//! an ordered list of items (typed attribute, nested child object, or a
//! cross-reference to a previously emitted object). Item names are short
//! and card-safe (at most 8 alphanumeric characters) so the legacy
//! header-card encoding never has to mangle them; lookups are
//! case-insensitive because that encoding uppercases keywords.

use crate::error::WcsError;
use crate::object::AttrValue;
use crate::Result;

/// One item of a document
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Attr { name: String, value: AttrValue },
    Child { name: String, doc: Document },
    Ref { name: String, index: usize },
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Attr { name, .. } | Item::Child { name, .. } | Item::Ref { name, .. } => name,
        }
    }
}

/// Serialized form of one object: class tag plus ordered items
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub class: String,
    pub items: Vec<Item>,
    /// 1-based source line of the block opener, when parsed from text;
    /// 0 for documents built programmatically
    pub line: usize,
}

impl Document {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            items: Vec::new(),
            line: 0,
        }
    }

    pub fn push_attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.items.push(Item::Attr {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn push_child(&mut self, name: impl Into<String>, doc: Document) {
        self.items.push(Item::Child {
            name: name.into(),
            doc,
        });
    }

    pub fn push_ref(&mut self, name: impl Into<String>, index: usize) {
        self.items.push(Item::Ref {
            name: name.into(),
            index,
        });
    }

    /// Attribute lookup, case-insensitive in the name
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.items.iter().find_map(|item| match item {
            Item::Attr { name: n, value } if n.eq_ignore_ascii_case(name) => Some(value),
            _ => None,
        })
    }

    /// Child or reference lookup, case-insensitive in the name
    pub fn object_item(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| match item {
            Item::Child { name: n, .. } | Item::Ref { name: n, .. } => {
                n.eq_ignore_ascii_case(name)
            }
            _ => false,
        })
    }

    /// Required integer attribute
    pub fn require_int(&self, name: &str) -> Result<i64> {
        match self.attr(name) {
            Some(v) => v.as_int().ok_or_else(|| self.type_error(name, "integer")),
            None => Err(self.missing(name)),
        }
    }

    /// Required integer attribute converted to usize
    pub fn require_usize(&self, name: &str) -> Result<usize> {
        let v = self.require_int(name)?;
        usize::try_from(v).map_err(|_| self.type_error(name, "non-negative integer"))
    }

    /// Required float attribute (integers widen)
    pub fn require_float(&self, name: &str) -> Result<f64> {
        match self.attr(name) {
            Some(v) => v.as_float().ok_or_else(|| self.type_error(name, "number")),
            None => Err(self.missing(name)),
        }
    }

    /// Required string attribute
    pub fn require_str(&self, name: &str) -> Result<&str> {
        match self.attr(name) {
            Some(v) => v.as_str().ok_or_else(|| self.type_error(name, "string")),
            None => Err(self.missing(name)),
        }
    }

    /// Optional float attribute
    pub fn get_float(&self, name: &str) -> Result<Option<f64>> {
        match self.attr(name) {
            Some(v) => v
                .as_float()
                .map(Some)
                .ok_or_else(|| self.type_error(name, "number")),
            None => Ok(None),
        }
    }

    /// Optional boolean attribute (numeric forms accepted), with default
    pub fn get_bool(&self, name: &str, default: bool) -> Result<bool> {
        match self.attr(name) {
            Some(v) => v
                .as_bool()
                .ok_or_else(|| self.type_error(name, "boolean")),
            None => Ok(default),
        }
    }

    /// Optional string attribute
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(|v| v.as_str())
    }

    fn missing(&self, name: &str) -> WcsError {
        WcsError::malformed(
            self.line,
            format!("{}: missing required attribute `{}`", self.class, name),
        )
    }

    fn type_error(&self, name: &str, expected: &str) -> WcsError {
        WcsError::malformed(
            self.line,
            format!("{}: attribute `{}` is not a {}", self.class, name, expected),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new("Frame");
        doc.push_attr("Naxes", 2i64);
        doc.push_attr("Epoch", 2000.5);
        doc.push_attr("Title", "test frame");
        doc.push_child("Frm", Document::new("Frame"));
        doc.push_ref("Map", 3);
        doc
    }

    #[test]
    fn test_attr_lookup_is_case_insensitive() {
        let doc = sample();
        assert_eq!(doc.require_int("Naxes").unwrap(), 2);
        assert_eq!(doc.require_int("NAXES").unwrap(), 2);
        assert_eq!(doc.require_str("TITLE").unwrap(), "test frame");
    }

    #[test]
    fn test_require_missing_is_malformed() {
        let doc = sample();
        let err = doc.require_int("Nope").unwrap_err();
        assert!(matches!(err, WcsError::MalformedInput { .. }));
        assert!(err.to_string().contains("Nope"));
    }

    #[test]
    fn test_int_widens_to_float() {
        let doc = sample();
        assert_eq!(doc.require_float("Naxes").unwrap(), 2.0);
        assert_eq!(doc.get_float("Epoch").unwrap(), Some(2000.5));
        assert_eq!(doc.get_float("Absent").unwrap(), None);
    }

    #[test]
    fn test_type_mismatch_is_malformed() {
        let doc = sample();
        assert!(doc.require_int("Title").is_err());
        assert!(doc.require_str("Naxes").is_err());
    }

    #[test]
    fn test_object_item_lookup() {
        let doc = sample();
        assert!(matches!(
            doc.object_item("Frm"),
            Some(Item::Child { .. })
        ));
        assert!(matches!(
            doc.object_item("MAP"),
            Some(Item::Ref { index: 3, .. })
        ));
        assert!(doc.object_item("Other").is_none());
    }
}
