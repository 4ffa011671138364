//! Legacy header-card encoding
//!
//! Fixed 80-column card images: keyword in columns 1–8 (uppercase,
//! left-justified), `= ` in columns 9–10, value from column 11, optional
//! `/ comment` after the value. Strings are single-quoted with internal
//! quotes doubled and padded to at least 8 characters; values too long for
//! one card end with `&` and continue on `CONTINUE` cards. Numbers are
//! right-justified to column 30.
//!
//! Object structure is carried by reserved `BEGIN`/`END` cards whose value
//! is the class name; for nested objects the item name rides in the card
//! comment. Cross-references are string values of the form `'@n'`.
//!
//! Reserved keywords: `BEGIN`, `END`, `CONTINUE`, `COMMENT`, `HISTORY`.
//! Any other card that does not take part in an object block is preserved
//! verbatim (see [`crate::channel::Channel::unrecognized`]) but never
//! interpreted.

use crate::channel::doc::{Document, Item};
use crate::error::WcsError;
use crate::object::{format_float, AttrValue};
use crate::Result;

const CARD_LEN: usize = 80;
const VALUE_COL: usize = 10;
const NUM_END_COL: usize = 30;
/// Longest string content that fits on one card with the closing quote
const STR_CHUNK: usize = 66;

pub(crate) const RESERVED: [&str; 5] = ["BEGIN", "END", "CONTINUE", "COMMENT", "HISTORY"];

/// Result of parsing one top-level object from a card stream
#[derive(Debug)]
pub(crate) struct CardParse {
    pub doc: Document,
    pub next: usize,
    pub unrecognized: Vec<String>,
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Render one document as a sequence of 80-column cards
pub(crate) fn write(doc: &Document, comments: bool) -> String {
    let mut out = String::new();
    write_block(doc, None, comments, &mut out);
    out
}

fn write_block(doc: &Document, item_name: Option<&str>, comments: bool, out: &mut String) {
    // Nested BEGIN cards carry the item name; the top-level card takes a
    // descriptive comment when comments are enabled
    let begin_comment = match item_name {
        Some(name) => Some(name),
        None if comments => Some("serialized object"),
        None => None,
    };
    push_card(out, "BEGIN", &quoted(&doc.class), begin_comment);
    for item in &doc.items {
        match item {
            Item::Attr { name, value } => {
                let keyword = name.to_uppercase();
                match value {
                    AttrValue::Str(s) => push_string_card(out, &keyword, s),
                    AttrValue::Int(v) => push_card(out, &keyword, &right_justified(&v.to_string()), None),
                    AttrValue::Float(v) => {
                        push_card(out, &keyword, &right_justified(&format_float(*v)), None)
                    }
                    AttrValue::Bool(v) => {
                        push_card(out, &keyword, &right_justified(if *v { "T" } else { "F" }), None)
                    }
                }
            }
            Item::Child { name, doc: child } => {
                write_block(child, Some(name), comments, out);
            }
            Item::Ref { name, index } => {
                push_string_card(out, &name.to_uppercase(), &format!("@{index}"));
            }
        }
    }
    push_card(out, "END", &quoted(&doc.class), None);
}

fn quoted(s: &str) -> String {
    let escaped = s.replace('\'', "''");
    format!("'{:<8}'", escaped)
}

fn right_justified(v: &str) -> String {
    format!("{:>width$}", v, width = NUM_END_COL - VALUE_COL)
}

fn push_card(out: &mut String, keyword: &str, value: &str, comment: Option<&str>) {
    let mut card = format!("{:<8}= {}", keyword, value);
    if let Some(comment) = comment {
        card.push_str(" / ");
        card.push_str(comment);
    }
    finish_card(out, card);
}

fn push_string_card(out: &mut String, keyword: &str, s: &str) {
    let escaped = s.replace('\'', "''");
    let chars: Vec<char> = escaped.chars().collect();
    if chars.len() < STR_CHUNK {
        push_card(out, keyword, &format!("'{:<8}'", escaped), None);
        return;
    }
    // Continuation: every non-final chunk is exactly STR_CHUNK characters
    // counting its trailing &, which is what the reader keys on
    let mut start = 0;
    let mut first = true;
    while start < chars.len() {
        let remaining = chars.len() - start;
        let take = remaining.min(STR_CHUNK - 1);
        let chunk: String = chars[start..start + take].iter().collect();
        start += take;
        let more = start < chars.len();
        let body = if more {
            format!("'{chunk}&'")
        } else {
            format!("'{:<8}'", chunk)
        };
        if first {
            push_card(out, keyword, &body, None);
            first = false;
        } else {
            finish_card(out, format!("{:<8}  {}", "CONTINUE", body));
        }
    }
}

fn finish_card(out: &mut String, mut card: String) {
    if card.len() > CARD_LEN {
        let mut end = CARD_LEN;
        while !card.is_char_boundary(end) {
            end -= 1;
        }
        card.truncate(end);
    }
    while card.len() < CARD_LEN {
        card.push(' ');
    }
    out.push_str(&card);
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Card {
    Begin { class: String, name: Option<String> },
    End { class: String },
    Value { keyword: String, value: CardValue },
    Continue { text: String, more: bool },
    Other,
}

#[derive(Debug)]
enum CardValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str { text: String, more: bool },
}

/// Parse one top-level object starting at line `pos`
pub(crate) fn parse(lines: &[&str], mut pos: usize) -> Result<CardParse> {
    let mut unrecognized = Vec::new();
    // Find the opening BEGIN, preserving everything before it
    loop {
        if pos >= lines.len() {
            return Err(WcsError::malformed(
                pos + 1,
                "expected a BEGIN card, found end of input",
            ));
        }
        match classify(lines[pos], pos + 1)? {
            Card::Begin { class, .. } => {
                let (doc, next) = parse_block(lines, pos + 1, class, pos + 1, &mut unrecognized)?;
                return Ok(CardParse {
                    doc,
                    next,
                    unrecognized,
                });
            }
            Card::End { .. } => {
                return Err(WcsError::malformed(pos + 1, "END card without a BEGIN"));
            }
            // Anything ahead of the object is somebody else's header
            // content: preserve it verbatim, interpret nothing
            _ => {
                if !lines[pos].trim().is_empty() {
                    unrecognized.push(lines[pos].to_string());
                }
                pos += 1;
            }
        }
    }
}

fn parse_block(
    lines: &[&str],
    mut pos: usize,
    class: String,
    begin_line: usize,
    unrecognized: &mut Vec<String>,
) -> Result<(Document, usize)> {
    let mut doc = Document::new(class.clone());
    doc.line = begin_line;
    while pos < lines.len() {
        let line_no = pos + 1;
        match classify(lines[pos], line_no)? {
            Card::End { class: end_class } => {
                if end_class != class {
                    return Err(WcsError::malformed(
                        line_no,
                        format!("END '{end_class}' does not match BEGIN '{class}'"),
                    ));
                }
                return Ok((doc, pos + 1));
            }
            Card::Begin {
                class: child_class,
                name,
            } => {
                let item_name = name.ok_or_else(|| {
                    WcsError::malformed(line_no, "nested BEGIN card has no item name comment")
                })?;
                let (child, next) =
                    parse_block(lines, pos + 1, child_class, line_no, unrecognized)?;
                doc.push_child(item_name, child);
                pos = next;
            }
            Card::Value { keyword, value } => {
                pos += 1;
                let value = match value {
                    CardValue::Int(v) => AttrValue::Int(v),
                    CardValue::Float(v) => AttrValue::Float(v),
                    CardValue::Bool(v) => AttrValue::Bool(v),
                    CardValue::Str { mut text, mut more } => {
                        while more {
                            if pos >= lines.len() {
                                return Err(WcsError::malformed(
                                    pos,
                                    "string continuation runs off the end of input",
                                ));
                            }
                            match classify(lines[pos], pos + 1)? {
                                Card::Continue { text: t, more: m } => {
                                    text.push_str(&t);
                                    more = m;
                                    pos += 1;
                                }
                                _ => {
                                    return Err(WcsError::malformed(
                                        pos + 1,
                                        "expected a CONTINUE card",
                                    ))
                                }
                            }
                        }
                        AttrValue::Str(text.trim_end().to_string())
                    }
                };
                if let AttrValue::Str(s) = &value {
                    if let Some(index) = s.strip_prefix('@') {
                        let index: usize = index.parse().map_err(|_| {
                            WcsError::malformed(line_no, format!("bad reference '@{index}'"))
                        })?;
                        doc.push_ref(keyword, index);
                        continue;
                    }
                }
                doc.items.push(Item::Attr {
                    name: keyword,
                    value,
                });
            }
            Card::Continue { .. } => {
                return Err(WcsError::malformed(
                    line_no,
                    "CONTINUE card without a preceding string",
                ))
            }
            Card::Other => {
                if !lines[pos].trim().is_empty() {
                    unrecognized.push(lines[pos].to_string());
                }
                pos += 1;
            }
        }
    }
    Err(WcsError::malformed(
        begin_line,
        format!("BEGIN '{class}' has no matching END"),
    ))
}

fn classify(line: &str, line_no: usize) -> Result<Card> {
    if line.len() > CARD_LEN {
        return Err(WcsError::malformed(
            line_no,
            format!("card is {} characters, maximum is {CARD_LEN}", line.len()),
        ));
    }
    if line.trim().is_empty() {
        return Ok(Card::Other);
    }
    let keyword: String = line.chars().take(8).collect::<String>().trim().to_string();
    let rest: String = line.chars().skip(8).collect();

    if keyword == "CONTINUE" {
        let text = rest.trim_start();
        let (content, _) = parse_quoted(text, line_no)?;
        let (content, more) = strip_continuation(content);
        return Ok(Card::Continue {
            text: content,
            more,
        });
    }
    let reserved = RESERVED.contains(&keyword.as_str());
    if keyword.is_empty() || (reserved && keyword != "BEGIN" && keyword != "END") {
        // COMMENT and HISTORY cards carry no structure
        return Ok(Card::Other);
    }
    if !rest.starts_with("= ") {
        return Ok(Card::Other);
    }
    let body = rest[2..].trim_start();
    if keyword == "BEGIN" || keyword == "END" {
        let (class, after) = parse_quoted(body, line_no)?;
        let class = class.trim_end().to_string();
        if keyword == "BEGIN" {
            let name = after
                .trim_start()
                .strip_prefix('/')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
            return Ok(Card::Begin { class, name });
        }
        return Ok(Card::End { class });
    }

    // Plain value card; a value this reader cannot type is treated as an
    // unrecognized card (preserved verbatim, never interpreted)
    let value = if body.starts_with('\'') {
        match parse_quoted(body, line_no) {
            Ok((content, _)) => {
                let (content, more) = strip_continuation(content);
                Some(CardValue::Str {
                    text: if more {
                        content
                    } else {
                        content.trim_end().to_string()
                    },
                    more,
                })
            }
            Err(_) => None,
        }
    } else {
        let token = body.split('/').next().unwrap_or("").trim();
        match token {
            "" => None,
            "T" => Some(CardValue::Bool(true)),
            "F" => Some(CardValue::Bool(false)),
            _ => {
                if let Ok(v) = token.parse::<i64>() {
                    Some(CardValue::Int(v))
                } else {
                    token.parse::<f64>().ok().map(CardValue::Float)
                }
            }
        }
    };
    match value {
        Some(value) => Ok(Card::Value { keyword, value }),
        None => Ok(Card::Other),
    }
}

/// Parse a single-quoted value with doubled-quote escapes; returns the
/// content and the remainder of the line after the closing quote
fn parse_quoted(text: &str, line_no: usize) -> Result<(String, &str)> {
    let inner = text
        .strip_prefix('\'')
        .ok_or_else(|| WcsError::malformed(line_no, format!("expected a quoted value in `{text}`")))?;
    let mut content = String::new();
    let mut chars = inner.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if ch == '\'' {
            if let Some((_, '\'')) = chars.peek() {
                content.push('\'');
                chars.next();
            } else {
                return Ok((content, &inner[i + 1..]));
            }
        } else {
            content.push(ch);
        }
    }
    Err(WcsError::malformed(
        line_no,
        format!("unterminated string in `{text}`"),
    ))
}

/// A chunk continues exactly when it is a full-width chunk ending in `&`;
/// ordinary string values are always written shorter than that, so a
/// data `&` never masquerades as a continuation marker.
fn strip_continuation(content: String) -> (String, bool) {
    if content.chars().count() == STR_CHUNK && content.ends_with('&') {
        let mut chars = content.chars();
        chars.next_back();
        (chars.as_str().to_string(), true)
    } else {
        (content, false)
    }
}
