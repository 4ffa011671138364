//! Markup encoding
//!
//! One element per object, tagged with the class name; nested objects are
//! child elements carrying their item name in a `name` attribute.
//! Attributes and cross-references are self-closing child elements:
//!
//! ```text
//! <FrameSet>
//!    <attr name="Nslot" type="int" value="2"/>
//!    <Frame name="Frm1">
//!       <attr name="Naxes" type="int" value="2"/>
//!    </Frame>
//!    <ref name="Frm2" index="1"/>
//! </FrameSet>
//! ```
//!
//! The reader is a minimal tag tokenizer: elements, attributes and the
//! four standard entities (`&amp;` `&lt;` `&gt;` `&quot;`); any non-space
//! character between tags is a structural error.

use crate::channel::doc::{Document, Item};
use crate::error::WcsError;
use crate::object::{format_float, AttrValue};
use crate::Result;

/// Render one document as a markup element tree
pub(crate) fn write(doc: &Document, indent_step: usize) -> String {
    let mut out = String::new();
    write_element(doc, None, 0, indent_step, &mut out);
    out
}

fn write_element(
    doc: &Document,
    item_name: Option<&str>,
    depth: usize,
    step: usize,
    out: &mut String,
) {
    let pad = " ".repeat(depth * step);
    out.push_str(&pad);
    out.push('<');
    out.push_str(&doc.class);
    if let Some(name) = item_name {
        out.push_str(&format!(" name=\"{}\"", escape(name)));
    }
    out.push_str(">\n");
    let inner = " ".repeat((depth + 1) * step);
    for item in &doc.items {
        match item {
            Item::Attr { name, value } => {
                let (kind, text) = match value {
                    AttrValue::Int(v) => ("int", v.to_string()),
                    AttrValue::Float(v) => ("float", format_float(*v)),
                    AttrValue::Bool(v) => ("bool", if *v { "1" } else { "0" }.to_string()),
                    AttrValue::Str(s) => ("str", s.clone()),
                };
                out.push_str(&inner);
                out.push_str(&format!(
                    "<attr name=\"{}\" type=\"{kind}\" value=\"{}\"/>\n",
                    escape(name),
                    escape(&text)
                ));
            }
            Item::Child { name, doc: child } => {
                write_element(child, Some(name), depth + 1, step, out);
            }
            Item::Ref { name, index } => {
                out.push_str(&inner);
                out.push_str(&format!(
                    "<ref name=\"{}\" index=\"{index}\"/>\n",
                    escape(name)
                ));
            }
        }
    }
    out.push_str(&pad);
    out.push_str(&format!("</{}>\n", doc.class));
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape(s: &str, line: usize) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let entity = ["&amp;", "&lt;", "&gt;", "&quot;"]
            .iter()
            .find(|e| rest.starts_with(**e));
        match entity {
            Some(e) => {
                out.push(match *e {
                    "&amp;" => '&',
                    "&lt;" => '<',
                    "&gt;" => '>',
                    _ => '"',
                });
                rest = &rest[e.len()..];
            }
            None => {
                return Err(WcsError::malformed(
                    line,
                    format!("unknown entity near `{}`", &rest[..rest.len().min(8)]),
                ))
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// One parsed markup tag
struct Tag {
    name: String,
    attrs: Vec<(String, String)>,
    closing: bool,
    self_closing: bool,
    line: usize,
}

impl Tag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

fn line_of(text: &str, pos: usize) -> usize {
    text[..pos.min(text.len())].matches('\n').count() + 1
}

/// Scan the next tag starting at or after `pos`; whitespace between tags
/// is skipped, anything else is an error
fn next_tag(text: &str, pos: usize) -> Result<Option<(Tag, usize)>> {
    let bytes = text.as_bytes();
    let mut i = pos;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= bytes.len() {
        return Ok(None);
    }
    let line = line_of(text, i);
    if bytes[i] != b'<' {
        let snippet: String = text[i..].chars().take(12).collect();
        return Err(WcsError::malformed(
            line,
            format!("unexpected text `{}`", snippet.trim_end()),
        ));
    }
    let end = text[i..]
        .find('>')
        .map(|e| i + e)
        .ok_or_else(|| WcsError::malformed(line, "unterminated tag"))?;
    let mut body = &text[i + 1..end];
    let closing = body.starts_with('/');
    if closing {
        body = &body[1..];
    }
    let self_closing = body.ends_with('/');
    if self_closing {
        body = &body[..body.len() - 1];
    }
    let body = body.trim();
    let (name, attr_text) = match body.find(char::is_whitespace) {
        Some(split) => (&body[..split], body[split..].trim_start()),
        None => (body, ""),
    };
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(WcsError::malformed(line, format!("bad tag name `{name}`")));
    }
    let mut attrs = Vec::new();
    let mut rest = attr_text;
    while !rest.is_empty() {
        let eq = rest.find('=').ok_or_else(|| {
            WcsError::malformed(line, format!("malformed attribute near `{rest}`"))
        })?;
        let attr_name = rest[..eq].trim().to_string();
        let after = rest[eq + 1..].trim_start();
        let inner = after.strip_prefix('"').ok_or_else(|| {
            WcsError::malformed(line, format!("attribute `{attr_name}` is not quoted"))
        })?;
        let close = inner.find('"').ok_or_else(|| {
            WcsError::malformed(line, format!("attribute `{attr_name}` is unterminated"))
        })?;
        attrs.push((attr_name, unescape(&inner[..close], line)?));
        rest = inner[close + 1..].trim_start();
    }
    Ok(Some((
        Tag {
            name: name.to_string(),
            attrs,
            closing,
            self_closing,
            line,
        },
        end + 1,
    )))
}

/// Parse one object element starting at or after byte `pos`; returns the
/// document and the byte offset just past its closing tag
pub(crate) fn parse(text: &str, pos: usize) -> Result<(Document, usize)> {
    let (tag, after) = next_tag(text, pos)?.ok_or_else(|| {
        WcsError::malformed(line_of(text, pos), "expected an element, found end of input")
    })?;
    if tag.closing || tag.self_closing {
        return Err(WcsError::malformed(
            tag.line,
            format!("expected an opening element, found `{}`", tag.name),
        ));
    }
    parse_element(text, tag, after)
}

fn parse_element(text: &str, open: Tag, mut pos: usize) -> Result<(Document, usize)> {
    let mut doc = Document::new(open.name.clone());
    doc.line = open.line;
    loop {
        let (tag, after) = next_tag(text, pos)?.ok_or_else(|| {
            WcsError::malformed(open.line, format!("<{}> has no closing tag", open.name))
        })?;
        if tag.closing {
            if tag.name != open.name {
                return Err(WcsError::malformed(
                    tag.line,
                    format!("</{}> does not match <{}>", tag.name, open.name),
                ));
            }
            return Ok((doc, after));
        }
        match tag.name.as_str() {
            "attr" => {
                if !tag.self_closing {
                    return Err(WcsError::malformed(tag.line, "<attr> must be self-closing"));
                }
                let name = require_attr(&tag, "name")?;
                let kind = require_attr(&tag, "type")?;
                let value = require_attr(&tag, "value")?;
                let value = match kind {
                    "int" => AttrValue::Int(value.parse().map_err(|_| {
                        WcsError::malformed(tag.line, format!("bad int `{value}`"))
                    })?),
                    "float" => AttrValue::Float(value.parse().map_err(|_| {
                        WcsError::malformed(tag.line, format!("bad float `{value}`"))
                    })?),
                    "bool" => AttrValue::Bool(value == "1"),
                    "str" => AttrValue::Str(value.to_string()),
                    other => {
                        return Err(WcsError::malformed(
                            tag.line,
                            format!("unknown attribute type `{other}`"),
                        ))
                    }
                };
                doc.items.push(Item::Attr {
                    name: name.to_string(),
                    value,
                });
                pos = after;
            }
            "ref" => {
                if !tag.self_closing {
                    return Err(WcsError::malformed(tag.line, "<ref> must be self-closing"));
                }
                let name = require_attr(&tag, "name")?;
                let index: usize = require_attr(&tag, "index")?.parse().map_err(|_| {
                    WcsError::malformed(tag.line, "bad reference index")
                })?;
                doc.push_ref(name, index);
                pos = after;
            }
            _ => {
                // Nested object element
                if tag.self_closing {
                    return Err(WcsError::malformed(
                        tag.line,
                        format!("object element <{}> cannot be self-closing", tag.name),
                    ));
                }
                let item_name = tag.attr("name").map(str::to_string).ok_or_else(|| {
                    WcsError::malformed(
                        tag.line,
                        format!("nested <{}> element has no name attribute", tag.name),
                    )
                })?;
                let (child, next) = parse_element(text, tag, after)?;
                doc.push_child(item_name, child);
                pos = next;
            }
        }
    }
}

fn require_attr<'a>(tag: &'a Tag, name: &str) -> Result<&'a str> {
    tag.attr(name).ok_or_else(|| {
        WcsError::malformed(
            tag.line,
            format!("<{}> is missing the `{name}` attribute", tag.name),
        )
    })
}
