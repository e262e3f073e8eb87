//! The row stream: tag byte, wire codec, and typed resolution.
//!
//! Each index owns one flat ordered sequence of rows. A row is a tag byte
//! plus a four-byte reference into the store the tag selects, giving the
//! fixed width 5 the uniform list requires.

use std::io::{Read, Write};
use std::sync::Arc;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::engine::entry::{HtmlEntry, PairEntry, TextEntry};
use crate::engine::index::IndexEntry;
use crate::{DictError, Result};

/// Wire width of one row: one tag byte plus a four-byte reference.
pub const ROW_WIDTH: usize = 5;

/// Row discriminator byte as persisted in the row array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RowKind {
    /// Translation pair row.
    Pair = 0,
    /// Headword marker for a token that has a main entry.
    TokenMain = 1,
    /// Plain text row.
    Text = 2,
    /// Headword marker for a token without a main entry.
    Token = 3,
    /// HTML entry row.
    Html = 4,
}

impl RowKind {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(RowKind::Pair),
            1 => Ok(RowKind::TokenMain),
            2 => Ok(RowKind::Text),
            3 => Ok(RowKind::Token),
            4 => Ok(RowKind::Html),
            _ => Err(DictError::corrupt(format!("unknown row tag: {}", tag))),
        }
    }

    /// True for both headword marker kinds.
    pub fn is_token(self) -> bool {
        matches!(self, RowKind::TokenMain | RowKind::Token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub kind: RowKind,
    /// Position of the referenced element: token rows index the owning
    /// index's sorted entries, the other kinds index the matching entry
    /// store.
    pub reference: u32,
}

impl Row {
    pub fn new(kind: RowKind, reference: u32) -> Self {
        Self { kind, reference }
    }

    pub fn from_reader<R: Read>(reader: &mut R, _version: u32) -> Result<Self> {
        let kind = RowKind::from_tag(reader.read_u8()?)?;
        let reference = reader.read_i32::<BigEndian>()? as u32;
        Ok(Self { kind, reference })
    }

    pub fn to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.kind.tag())?;
        writer.write_i32::<BigEndian>(self.reference as i32)?;
        Ok(())
    }
}

/// A row resolved into its typed entry.
#[derive(Debug, Clone)]
pub enum RowData {
    Pair(Arc<PairEntry>),
    Token {
        entry: Arc<IndexEntry>,
        has_main_entry: bool,
    },
    Text(Arc<TextEntry>),
    Html(Arc<HtmlEntry>),
}
