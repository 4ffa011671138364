//! Channel: object graph serialization
//!
//! A [`Channel`] converts objects to and from an external representation.
//! Three encodings are supported: the native structured text format
//! ([`native`]), the legacy fixed-width header-card format ([`cards`]) and
//! a nested markup format ([`xml`]). All three share the intermediate
//! [`doc::Document`] tree, so any object that round-trips through one
//! round-trips through the others.
//!
//! A channel is transient: open it, move one or more objects through it,
//! drop it. Reads are restartable per call and atomic — a failed read
//! reports `MalformedInput` (or `Io`) and leaves no partially built
//! object behind. Writes refuse unregistered classes with
//! `UnsupportedType`.
//!
//! # Example
//!
//! ```
//! use ferro_wcs::channel::Channel;
//! use ferro_wcs::frame::Frame;
//! use ferro_wcs::object::{Object, WcsObject};
//!
//! let mut frame = Frame::new(2);
//! frame.set_attr("Label(1)", "RA").unwrap();
//!
//! let mut channel = Channel::native();
//! let text = channel.encode(&frame.clone().into()).unwrap();
//! let back = channel.decode(&text).unwrap();
//! assert!(back.same_as(&frame.into()));
//! ```

pub mod cards;
pub(crate) mod codec;
pub mod doc;
pub mod native;
pub(crate) mod registry;
pub mod xml;

use std::io::{BufRead, Write};

use crate::error::WcsError;
use crate::object::{AttrKind, AttrValue, Object, WcsObject};
use crate::Result;

/// Wire encoding of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Native,
    Cards,
    Markup,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Native => "native",
            Encoding::Cards => "cards",
            Encoding::Markup => "markup",
        }
    }

    pub fn from_name(name: &str) -> Option<Encoding> {
        match name {
            "native" => Some(Encoding::Native),
            "cards" => Some(Encoding::Cards),
            "markup" => Some(Encoding::Markup),
            _ => None,
        }
    }
}

/// Serialization endpoint for the object graph
#[derive(Debug, Clone, Default)]
pub struct Channel {
    encoding: Encoding,
    indent: usize,
    comments: bool,
    unrecognized: Vec<String>,
}

impl Channel {
    /// A channel with the given encoding; indent and comment settings come
    /// from the loaded configuration
    pub fn new(encoding: Encoding) -> Self {
        let config = crate::config::global();
        Self {
            encoding,
            indent: config.indent(),
            comments: config.channel.comments.unwrap_or(true),
            unrecognized: Vec::new(),
        }
    }

    /// Channel using the configured default encoding
    pub fn from_config() -> Self {
        let config = crate::config::global();
        let encoding = config
            .channel
            .encoding
            .as_deref()
            .and_then(Encoding::from_name)
            .unwrap_or_default();
        Self::new(encoding)
    }

    /// Native structured text channel
    pub fn native() -> Self {
        Self::new(Encoding::Native)
    }

    /// Legacy header-card channel
    pub fn cards() -> Self {
        Self::new(Encoding::Cards)
    }

    /// Markup channel
    pub fn markup() -> Self {
        Self::new(Encoding::Markup)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Serialize one object (and transitively everything it owns)
    ///
    /// Shared sub-objects are emitted once and referenced afterwards, so
    /// sharing is reconstructed rather than duplicated on read. Fails with
    /// `UnsupportedType` when the class has no registered serializer.
    pub fn encode(&self, obj: &WcsObject) -> Result<String> {
        let class = obj.class_name();
        if !registry::is_registered(class) {
            return Err(WcsError::UnsupportedType {
                class: class.to_string(),
            });
        }
        let mut ctx = codec::WriteCtx::new();
        let doc = codec::to_doc(obj, &mut ctx);
        log::debug!("channel write: {} via {}", class, self.encoding.name());
        Ok(match self.encoding {
            Encoding::Native => native::write(&doc, self.indent),
            Encoding::Cards => cards::write(&doc, self.comments),
            Encoding::Markup => xml::write(&doc, self.indent),
        })
    }

    /// Reconstruct the first object in `text`
    ///
    /// For the card encoding, unrecognized cards encountered during the
    /// read are preserved verbatim and retrievable through
    /// [`Channel::unrecognized`] until the next read.
    pub fn decode(&mut self, text: &str) -> Result<WcsObject> {
        let (obj, _) = self.decode_at(text, 0)?;
        Ok(obj)
    }

    /// Reconstruct every object in `text`, in order
    pub fn decode_all(&mut self, text: &str) -> Result<Vec<WcsObject>> {
        let mut objects = Vec::new();
        let mut pos = 0;
        let mut unrecognized = Vec::new();
        while !self.at_end(text, pos) {
            let (obj, next) = self.decode_at(text, pos)?;
            unrecognized.append(&mut self.unrecognized);
            objects.push(obj);
            pos = next;
        }
        self.unrecognized = unrecognized;
        Ok(objects)
    }

    /// Write one object to a byte sink; transport failures are `Io`
    pub fn write_to(&self, obj: &WcsObject, sink: &mut dyn Write) -> Result<usize> {
        let text = self.encode(obj)?;
        sink.write_all(text.as_bytes())?;
        Ok(text.len())
    }

    /// Read one object from a byte source; transport failures are `Io`
    pub fn read_from(&mut self, source: &mut dyn BufRead) -> Result<WcsObject> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;
        self.decode(&text)
    }

    /// Re-encode serialized text into another channel's encoding
    pub fn transcode(&mut self, text: &str, target: &Channel) -> Result<String> {
        let objects = self.decode_all(text)?;
        let mut out = String::new();
        for obj in &objects {
            out.push_str(&target.encode(obj)?);
        }
        Ok(out)
    }

    /// Cards preserved verbatim (not interpreted) by the last read on a
    /// card channel; empty for the other encodings
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    fn decode_at(&mut self, text: &str, pos: usize) -> Result<(WcsObject, usize)> {
        self.unrecognized.clear();
        let (doc, next) = match self.encoding {
            Encoding::Native => {
                let lines: Vec<&str> = text.lines().collect();
                let (doc, next_line) = native::parse(&lines, pos)?;
                (doc, next_line)
            }
            Encoding::Cards => {
                let lines: Vec<&str> = text.lines().collect();
                let parsed = cards::parse(&lines, pos)?;
                self.unrecognized = parsed.unrecognized;
                (parsed.doc, parsed.next)
            }
            Encoding::Markup => xml::parse(text, pos)?,
        };
        let mut ctx = codec::ReadCtx::new();
        let obj = codec::from_doc(&doc, &mut ctx)?;
        log::debug!(
            "channel read: {} via {}",
            obj.class_name(),
            self.encoding.name()
        );
        Ok((obj, next))
    }

    /// Position bookkeeping differs per encoding: lines for the text
    /// formats, bytes for markup
    fn at_end(&self, text: &str, pos: usize) -> bool {
        match self.encoding {
            Encoding::Native | Encoding::Cards => {
                let lines: Vec<&str> = text.lines().collect();
                lines[pos.min(lines.len())..]
                    .iter()
                    .all(|l| l.trim().is_empty() || (self.encoding == Encoding::Native && l.trim_start().starts_with('#')))
            }
            Encoding::Markup => text[pos.min(text.len())..].trim().is_empty(),
        }
    }
}

impl Object for Channel {
    fn class_name(&self) -> &'static str {
        "Channel"
    }

    fn get_attr(&self, name: &str) -> Result<AttrValue> {
        match name {
            "Class" => Ok(AttrValue::Str("Channel".to_string())),
            "Encoding" => Ok(AttrValue::Str(self.encoding.name().to_string())),
            "Indent" => Ok(AttrValue::Int(self.indent as i64)),
            "Comment" => Ok(AttrValue::Bool(self.comments)),
            _ => Err(WcsError::unknown_attr("Channel", name)),
        }
    }

    fn set_attr(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "Encoding" => match Encoding::from_name(value) {
                Some(encoding) => {
                    self.encoding = encoding;
                    Ok(())
                }
                None => Err(WcsError::bad_attr_value(
                    "Encoding",
                    format!("unknown encoding `{value}`"),
                )),
            },
            "Indent" => {
                let v = AttrValue::parse(name, AttrKind::Int, value)?;
                match v.as_int() {
                    Some(indent) if (0..=16).contains(&indent) => {
                        self.indent = indent as usize;
                        Ok(())
                    }
                    _ => Err(WcsError::bad_attr_value(
                        "Indent",
                        format!("indent `{value}` out of range 0..=16"),
                    )),
                }
            }
            "Comment" => {
                let v = AttrValue::parse(name, AttrKind::Bool, value)?;
                self.comments = v.as_bool().unwrap_or(true);
                Ok(())
            }
            "Class" => Err(WcsError::ReadOnlyAttribute {
                class: "Channel".to_string(),
                name: name.to_string(),
            }),
            _ => Err(WcsError::unknown_attr("Channel", name)),
        }
    }

    fn attr_is_set(&self, name: &str) -> bool {
        matches!(name, "Encoding" | "Indent" | "Comment")
    }

    fn clear_attr(&mut self, name: &str) -> Result<()> {
        match name {
            "Encoding" => {
                self.encoding = Encoding::default();
                Ok(())
            }
            "Indent" => {
                self.indent = crate::config::global().indent();
                Ok(())
            }
            "Comment" => {
                self.comments = true;
                Ok(())
            }
            _ => Err(WcsError::unknown_attr("Channel", name)),
        }
    }
}
