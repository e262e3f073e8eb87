//! Dictionary entry payload kinds and their wire codecs.
//!
//! The entry store is four parallel addressable lists: translation pairs,
//! plain text, HTML titles, and gzip-compressed HTML bodies. Every entry
//! carries the ordinal of the source corpus it came from. All structs decode
//! with `from_reader(reader, version)` so legacy element layouts branch in
//! place, and encode with explicit `to_writer` methods.

use std::io::{Read, Write};
use std::sync::Arc;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::storage::mutf8::{read_mutf8, write_mutf8};
use crate::utils::compression::{gzip_compress, gzip_decompress};
use crate::{DictError, Result};

/// A source corpus entries were compiled from.
///
/// Its stable ordinal is its position in the dictionary's source list;
/// entries reference it by that ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySource {
    pub name: String,
    pub num_entries: u32,
}

impl EntrySource {
    pub fn new<S: Into<String>>(name: S, num_entries: u32) -> Self {
        Self {
            name: name.into(),
            num_entries,
        }
    }

    pub fn from_reader<R: Read>(reader: &mut R, _version: u32) -> Result<Self> {
        let name = read_mutf8(reader)?;
        let num_entries = reader.read_i32::<BigEndian>()? as u32;
        Ok(Self { name, num_entries })
    }

    pub fn to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_mutf8(writer, &self.name)?;
        writer.write_i32::<BigEndian>(self.num_entries as i32)?;
        Ok(())
    }
}

/// One translation pair. Which side is the headword side is decided by the
/// containing index's `swap_pair_entries` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub lang_a: String,
    pub lang_b: String,
}

impl Pair {
    pub fn new<A: Into<String>, B: Into<String>>(lang_a: A, lang_b: B) -> Self {
        Self {
            lang_a: lang_a.into(),
            lang_b: lang_b.into(),
        }
    }

    /// The side for the querying index.
    pub fn side(&self, swapped: bool) -> &str {
        if swapped {
            &self.lang_b
        } else {
            &self.lang_a
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairEntry {
    pub source: u16,
    pub pairs: Vec<Pair>,
}

impl PairEntry {
    pub fn new(source: u16, pairs: Vec<Pair>) -> Self {
        Self { source, pairs }
    }

    pub fn from_reader<R: Read>(reader: &mut R, _version: u32) -> Result<Self> {
        let source = reader.read_i16::<BigEndian>()? as u16;
        let num_pairs = reader.read_i32::<BigEndian>()?;
        if num_pairs <= 0 {
            return Err(DictError::corrupt(format!(
                "pair entry with {} pairs",
                num_pairs
            )));
        }
        let mut pairs = Vec::with_capacity(num_pairs as usize);
        for _ in 0..num_pairs {
            let lang_a = read_mutf8(reader)?;
            let lang_b = read_mutf8(reader)?;
            pairs.push(Pair { lang_a, lang_b });
        }
        Ok(Self { source, pairs })
    }

    pub fn to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.pairs.is_empty() {
            return Err(DictError::invalid_parameter("pair entry with no pairs"));
        }
        writer.write_i16::<BigEndian>(self.source as i16)?;
        writer.write_i32::<BigEndian>(self.pairs.len() as i32)?;
        for pair in &self.pairs {
            write_mutf8(writer, &pair.lang_a)?;
            write_mutf8(writer, &pair.lang_b)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub source: u16,
    pub text: String,
}

impl TextEntry {
    pub fn new<S: Into<String>>(source: u16, text: S) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }

    pub fn from_reader<R: Read>(reader: &mut R, _version: u32) -> Result<Self> {
        let source = reader.read_i16::<BigEndian>()? as u16;
        let text = read_mutf8(reader)?;
        Ok(Self { source, text })
    }

    pub fn to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i16::<BigEndian>(self.source as i16)?;
        write_mutf8(writer, &self.text)?;
        Ok(())
    }
}

/// A gzip-compressed UTF-8 HTML body with the original length recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlBody {
    pub uncompressed_len: u32,
    pub data: Vec<u8>,
}

impl HtmlBody {
    /// Compresses `text` for storage.
    pub fn compress(text: &str) -> Result<Self> {
        let raw = text.as_bytes();
        Ok(Self {
            uncompressed_len: raw.len() as u32,
            data: gzip_compress(raw)?,
        })
    }

    /// Decompresses back to the original text.
    pub fn text(&self) -> Result<String> {
        let raw = gzip_decompress(&self.data, self.uncompressed_len as usize)?;
        String::from_utf8(raw)
            .map_err(|e| DictError::corrupt(format!("HTML body is not UTF-8: {}", e)))
    }

    pub fn from_reader<R: Read>(reader: &mut R, _version: u32) -> Result<Self> {
        let uncompressed_len = reader.read_i32::<BigEndian>()?;
        let compressed_len = reader.read_i32::<BigEndian>()?;
        if uncompressed_len < 0 || compressed_len < 0 {
            return Err(DictError::corrupt("negative HTML body length"));
        }
        let mut data = vec![0u8; compressed_len as usize];
        reader.read_exact(&mut data)?;
        Ok(Self {
            uncompressed_len: uncompressed_len as u32,
            data,
        })
    }

    pub fn to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<BigEndian>(self.uncompressed_len as i32)?;
        writer.write_i32::<BigEndian>(self.data.len() as i32)?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}

/// Where an HTML title's body lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlRef {
    /// Ordinal into the dictionary's body store (v7 layout).
    Stored(u32),
    /// Body carried inline with the title (v5-6 layout, and dictionaries
    /// built in memory).
    Inline(Arc<HtmlBody>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlEntry {
    pub source: u16,
    pub title: String,
    pub body: HtmlRef,
}

impl HtmlEntry {
    /// Creates an in-memory entry carrying its body inline.
    pub fn new<S: Into<String>>(source: u16, title: S, body_html: &str) -> Result<Self> {
        Ok(Self {
            source,
            title: title.into(),
            body: HtmlRef::Inline(Arc::new(HtmlBody::compress(body_html)?)),
        })
    }

    pub fn from_reader<R: Read>(reader: &mut R, version: u32) -> Result<Self> {
        let source = reader.read_i16::<BigEndian>()? as u16;
        let title = read_mutf8(reader)?;
        let body = if version >= 7 {
            let body_ref = reader.read_i32::<BigEndian>()?;
            if body_ref < 0 {
                return Err(DictError::corrupt(format!(
                    "negative HTML body reference: {}",
                    body_ref
                )));
            }
            HtmlRef::Stored(body_ref as u32)
        } else {
            HtmlRef::Inline(Arc::new(HtmlBody::from_reader(reader, version)?))
        };
        Ok(Self {
            source,
            title,
            body,
        })
    }

    /// v7 form: title plus a reference into the body store.
    pub fn to_writer_v7<W: Write>(&self, writer: &mut W, body_ref: u32) -> Result<()> {
        writer.write_i16::<BigEndian>(self.source as i16)?;
        write_mutf8(writer, &self.title)?;
        writer.write_i32::<BigEndian>(body_ref as i32)?;
        Ok(())
    }

    /// v6 form: the body travels inline after the title.
    pub fn to_writer_v6<W: Write>(&self, writer: &mut W, body: &HtmlBody) -> Result<()> {
        writer.write_i16::<BigEndian>(self.source as i16)?;
        write_mutf8(writer, &self.title)?;
        body.to_writer(writer)?;
        Ok(())
    }
}
