//! Native structured text encoding
//!
//! One object per top-level block:
//!
//! ```text
//! Begin FrameSet
//!    Nslot = 2
//!    Base = 1
//!    Current = 2
//!    Frm1 =
//!       Begin Frame
//!          Naxes = 2
//!          Lbl1 = "RA"
//!       End Frame
//!    Frm2 = @1
//! End FrameSet
//! ```
//!
//! Attribute lines are `Name = Value`: integers bare, floats in shortest
//! round-trip form (always carrying a `.` or exponent), strings
//! double-quoted with `\"` and `\\` escapes. Nested objects follow an
//! empty-valued `Name =` line; `@n` is a cross-reference. Lines starting
//! with `#` are comments.

use nom::{
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, space0, space1},
    combinator::recognize,
    multi::many0,
    sequence::preceded,
    IResult, Parser,
};

use crate::channel::doc::{Document, Item};
use crate::error::WcsError;
use crate::object::{format_float, AttrValue};
use crate::Result;

/// Render one document as a native-format block
pub(crate) fn write(doc: &Document, indent_step: usize) -> String {
    let mut out = String::new();
    write_block(doc, 0, indent_step, &mut out);
    out
}

fn write_block(doc: &Document, depth: usize, step: usize, out: &mut String) {
    let pad = " ".repeat(depth * step);
    out.push_str(&pad);
    out.push_str("Begin ");
    out.push_str(&doc.class);
    out.push('\n');
    let inner = " ".repeat((depth + 1) * step);
    for item in &doc.items {
        match item {
            Item::Attr { name, value } => {
                out.push_str(&inner);
                out.push_str(name);
                out.push_str(" = ");
                out.push_str(&format_value(value));
                out.push('\n');
            }
            Item::Child { name, doc: child } => {
                out.push_str(&inner);
                out.push_str(name);
                out.push_str(" =\n");
                write_block(child, depth + 2, step, out);
            }
            Item::Ref { name, index } => {
                out.push_str(&inner);
                out.push_str(name);
                out.push_str(" = @");
                out.push_str(&index.to_string());
                out.push('\n');
            }
        }
    }
    out.push_str(&pad);
    out.push_str("End ");
    out.push_str(&doc.class);
    out.push('\n');
}

fn format_value(value: &AttrValue) -> String {
    match value {
        AttrValue::Int(v) => v.to_string(),
        AttrValue::Float(v) => format_float(*v),
        AttrValue::Bool(v) => if *v { "1" } else { "0" }.to_string(),
        AttrValue::Str(s) => quote(s),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn unquote(s: &str, line: usize) -> Result<String> {
    let inner = s
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(|| WcsError::malformed(line, format!("unterminated string `{s}`")))?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(escaped @ ('"' | '\\')) => out.push(escaped),
                _ => {
                    return Err(WcsError::malformed(
                        line,
                        format!("bad escape in string `{s}`"),
                    ))
                }
            }
        } else if ch == '"' {
            return Err(WcsError::malformed(
                line,
                format!("unescaped quote in string `{s}`"),
            ));
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

/// Item name: alphabetic start, then alphanumerics
fn ident(input: &str) -> IResult<&str, &str> {
    recognize((alpha1, many0(alphanumeric1))).parse(input)
}

fn begin_line(input: &str) -> IResult<&str, &str> {
    preceded((space0, tag("Begin"), space1), ident).parse(input)
}

fn end_line(input: &str) -> IResult<&str, &str> {
    preceded((space0, tag("End"), space1), ident).parse(input)
}

/// `Name = <rest>`; returns the name and the raw value text
fn attr_line(input: &str) -> IResult<&str, (&str, &str)> {
    let (rest, name) = preceded(space0, ident).parse(input)?;
    let (rest, _) = (space0, tag("="), space0).parse(rest)?;
    Ok(("", (name, rest.trim_end())))
}

/// One parsed line of the native grammar
enum Line<'a> {
    Begin(&'a str),
    End(&'a str),
    Attr(&'a str, &'a str),
    Blank,
}

fn classify(raw: &str) -> Option<Line<'_>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Some(Line::Blank);
    }
    if let Ok((rest, class)) = begin_line(raw) {
        if rest.trim().is_empty() {
            return Some(Line::Begin(class));
        }
    }
    if let Ok((rest, class)) = end_line(raw) {
        if rest.trim().is_empty() {
            return Some(Line::End(class));
        }
    }
    if let Ok((_, (name, value))) = attr_line(raw) {
        return Some(Line::Attr(name, value));
    }
    None
}

/// Advance past blank and comment lines
pub(crate) fn skip_blank(lines: &[&str], mut pos: usize) -> usize {
    while pos < lines.len() {
        let t = lines[pos].trim();
        if t.is_empty() || t.starts_with('#') {
            pos += 1;
        } else {
            break;
        }
    }
    pos
}

/// Parse one block starting at `pos` (which must hold the `Begin` line);
/// returns the document and the index of the line after its `End`
pub(crate) fn parse(lines: &[&str], pos: usize) -> Result<(Document, usize)> {
    let pos = skip_blank(lines, pos);
    if pos >= lines.len() {
        return Err(WcsError::malformed(pos + 1, "expected `Begin`, found end of input"));
    }
    match classify(lines[pos]) {
        Some(Line::Begin(class)) => parse_body(lines, pos + 1, class, pos + 1),
        _ => Err(WcsError::malformed(
            pos + 1,
            format!("expected `Begin`, found `{}`", lines[pos].trim()),
        )),
    }
}

fn parse_body(
    lines: &[&str],
    mut pos: usize,
    class: &str,
    begin_line_no: usize,
) -> Result<(Document, usize)> {
    let mut doc = Document::new(class);
    doc.line = begin_line_no;
    while pos < lines.len() {
        match classify(lines[pos]) {
            Some(Line::Blank) => pos += 1,
            Some(Line::End(end_class)) => {
                if end_class != class {
                    return Err(WcsError::malformed(
                        pos + 1,
                        format!("`End {end_class}` does not match `Begin {class}`"),
                    ));
                }
                return Ok((doc, pos + 1));
            }
            Some(Line::Begin(_)) => {
                return Err(WcsError::malformed(
                    pos + 1,
                    "nested object must follow a `Name =` line",
                ));
            }
            Some(Line::Attr(name, value)) => {
                let line_no = pos + 1;
                if value.is_empty() {
                    // Nested child block follows
                    let next = skip_blank(lines, pos + 1);
                    let (child, after) = match next < lines.len() {
                        true => match classify(lines[next]) {
                            Some(Line::Begin(child_class)) => {
                                parse_body(lines, next + 1, child_class, next + 1)?
                            }
                            _ => {
                                return Err(WcsError::malformed(
                                    next + 1,
                                    format!("expected `Begin` after `{name} =`"),
                                ))
                            }
                        },
                        false => {
                            return Err(WcsError::malformed(
                                line_no,
                                format!("`{name} =` at end of input"),
                            ))
                        }
                    };
                    doc.push_child(name, child);
                    pos = after;
                } else if let Some(index) = value.strip_prefix('@') {
                    let index: usize = index.parse().map_err(|_| {
                        WcsError::malformed(line_no, format!("bad reference `{value}`"))
                    })?;
                    doc.push_ref(name, index);
                    pos += 1;
                } else {
                    doc.items.push(Item::Attr {
                        name: name.to_string(),
                        value: parse_value(value, line_no)?,
                    });
                    pos += 1;
                }
            }
            None => {
                return Err(WcsError::malformed(
                    pos + 1,
                    format!("unrecognized line `{}`", lines[pos].trim()),
                ))
            }
        }
    }
    Err(WcsError::malformed(
        begin_line_no,
        format!("`Begin {class}` has no matching `End`"),
    ))
}

fn parse_value(text: &str, line: usize) -> Result<AttrValue> {
    if text.starts_with('"') {
        return Ok(AttrValue::Str(unquote(text, line)?));
    }
    if let Ok(v) = text.parse::<i64>() {
        return Ok(AttrValue::Int(v));
    }
    if let Ok(v) = text.parse::<f64>() {
        return Ok(AttrValue::Float(v));
    }
    Err(WcsError::malformed(line, format!("bad value `{text}`")))
}
