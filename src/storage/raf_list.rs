//! Addressable list: a persisted ordered sequence openable by byte offset.
//!
//! On-disk layout:
//!
//! ```text
//! [ i32 count ]
//! [ i64 offset[0] ]          absolute byte offset of element 0
//! [ i64 offset[1] ] ...
//! [ i64 offset[count] ]      one past the last element, = end_offset
//! [ raw element bytes ... ]
//! ```
//!
//! The offset table is read once at construction and kept in memory;
//! elements are decoded on demand, so `get(i)` costs one positioned read
//! without touching any other element. Decoders receive the containing
//! dictionary's file version so legacy element layouts can branch in place.

use std::io::{Seek, SeekFrom, Write};
use std::sync::Arc;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::storage::caching_list::RandomAccess;
use crate::storage::dict_file::{DictFile, SectionReader};
use crate::{DictError, Result};

/// Decodes one element from a reader positioned at its start offset.
pub type ElementReader<T> = Box<dyn Fn(&mut SectionReader, u32) -> Result<T> + Send + Sync>;

pub struct RafList<T> {
    file: Arc<DictFile>,
    toc: Vec<u64>,
    version: u32,
    read_elem: ElementReader<T>,
}

impl<T> std::fmt::Debug for RafList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RafList")
            .field("toc", &self.toc)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl<T> RafList<T> {
    /// Opens the list whose count field starts at `start`, reading and
    /// validating the whole offset table.
    pub fn open(
        file: Arc<DictFile>,
        start: u64,
        version: u32,
        read_elem: ElementReader<T>,
    ) -> Result<Self> {
        let mut reader = SectionReader::new(Arc::clone(&file), start);
        let count = reader.read_i32::<BigEndian>()?;
        if count < 0 {
            return Err(DictError::corrupt(format!("negative list count: {}", count)));
        }
        let count = count as usize;
        let mut toc = Vec::with_capacity(count + 1);
        for _ in 0..=count {
            let offset = reader.read_i64::<BigEndian>()?;
            if offset < 0 || offset as u64 > file.len() {
                return Err(DictError::corrupt(format!(
                    "list offset {} outside file of {} bytes",
                    offset,
                    file.len()
                )));
            }
            let offset = offset as u64;
            if toc.last().is_some_and(|prev| *prev > offset) {
                return Err(DictError::corrupt("list offsets are not monotonic"));
            }
            toc.push(offset);
        }
        Ok(Self {
            file,
            toc,
            version,
            read_elem,
        })
    }

    /// Offset of the first byte past the last element.
    pub fn end_offset(&self) -> u64 {
        self.toc[self.toc.len() - 1]
    }
}

impl<T: Send + Sync> RandomAccess<T> for RafList<T> {
    fn len(&self) -> usize {
        self.toc.len() - 1
    }

    fn get(&self, index: usize) -> Result<Arc<T>> {
        if index >= self.len() {
            return Err(DictError::invalid_parameter(format!(
                "list index {} out of range 0..{}",
                index,
                self.len()
            )));
        }
        let mut reader = SectionReader::new(Arc::clone(&self.file), self.toc[index]);
        let value = (self.read_elem)(&mut reader, self.version)?;
        Ok(Arc::new(value))
    }
}

/// Writes `list` in the offset-table layout.
///
/// Reserves space for the count and offsets, writes the elements
/// sequentially recording their absolute start offsets, then rewinds and
/// fills the table. The write callback also receives the element's ordinal.
pub fn write_list<T, W, F>(out: &mut W, list: &dyn RandomAccess<T>, mut write_elem: F) -> Result<()>
where
    W: Write + Seek,
    F: FnMut(&mut W, &T, usize) -> Result<()>,
{
    let count = list.len();
    out.write_i32::<BigEndian>(count as i32)?;
    let toc_pos = out.stream_position()?;
    out.seek(SeekFrom::Start(toc_pos + (count as u64 + 1) * 8))?;
    let mut toc = Vec::with_capacity(count + 1);
    for i in 0..count {
        toc.push(out.stream_position()?);
        let elem = list.get(i)?;
        write_elem(out, &elem, i)?;
    }
    let end = out.stream_position()?;
    toc.push(end);
    out.seek(SeekFrom::Start(toc_pos))?;
    for offset in &toc {
        out.write_i64::<BigEndian>(*offset as i64)?;
    }
    out.seek(SeekFrom::Start(end))?;
    Ok(())
}

/// Slice variant of [`write_list`] for elements already in memory.
pub fn write_items<T, W, F>(out: &mut W, items: &[T], mut write_elem: F) -> Result<()>
where
    W: Write + Seek,
    F: FnMut(&mut W, &T, usize) -> Result<()>,
{
    out.write_i32::<BigEndian>(items.len() as i32)?;
    let toc_pos = out.stream_position()?;
    out.seek(SeekFrom::Start(toc_pos + (items.len() as u64 + 1) * 8))?;
    let mut toc = Vec::with_capacity(items.len() + 1);
    for (i, item) in items.iter().enumerate() {
        toc.push(out.stream_position()?);
        write_elem(out, item, i)?;
    }
    let end = out.stream_position()?;
    toc.push(end);
    out.seek(SeekFrom::Start(toc_pos))?;
    for offset in &toc {
        out.write_i64::<BigEndian>(*offset as i64)?;
    }
    out.seek(SeekFrom::Start(end))?;
    Ok(())
}
