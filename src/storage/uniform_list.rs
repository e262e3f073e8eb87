//! Uniform addressable list: the fixed-width variant.
//!
//! On-disk layout:
//!
//! ```text
//! [ i32 count ][ i32 width ][ raw element bytes x count ]
//! ```
//!
//! With every element exactly `width` bytes there is no per-element offset
//! table; `get(i)` seeks straight to `header_end + i * width`. Used for the
//! row arrays (width 5: one tag byte plus a four-byte reference).

use std::io::{Seek, Write};
use std::sync::Arc;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::storage::caching_list::RandomAccess;
use crate::storage::dict_file::{DictFile, SectionReader};
use crate::storage::raf_list::ElementReader;
use crate::{DictError, Result};

pub struct UniformList<T> {
    file: Arc<DictFile>,
    data_start: u64,
    count: usize,
    width: usize,
    version: u32,
    read_elem: ElementReader<T>,
}

impl<T> std::fmt::Debug for UniformList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniformList")
            .field("data_start", &self.data_start)
            .field("count", &self.count)
            .field("width", &self.width)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl<T> UniformList<T> {
    /// Opens the list whose header starts at `start`. The reader refuses a
    /// persisted width other than the one the element decoder declares.
    pub fn open(
        file: Arc<DictFile>,
        start: u64,
        version: u32,
        expected_width: usize,
        read_elem: ElementReader<T>,
    ) -> Result<Self> {
        let mut reader = SectionReader::new(Arc::clone(&file), start);
        let count = reader.read_i32::<BigEndian>()?;
        if count < 0 {
            return Err(DictError::corrupt(format!("negative list count: {}", count)));
        }
        let width = reader.read_i32::<BigEndian>()?;
        if width as usize != expected_width {
            return Err(DictError::corrupt(format!(
                "uniform element width {} not decodable, expected {}",
                width, expected_width
            )));
        }
        let count = count as usize;
        let data_start = start + 8;
        let end = data_start + (count * expected_width) as u64;
        if end > file.len() {
            return Err(DictError::corrupt(format!(
                "uniform list of {} x {} bytes overruns file at {}",
                count, expected_width, end
            )));
        }
        Ok(Self {
            file,
            data_start,
            count,
            width: expected_width,
            version,
            read_elem,
        })
    }

    /// Offset of the first byte past the last element.
    pub fn end_offset(&self) -> u64 {
        self.data_start + (self.count * self.width) as u64
    }
}

impl<T: Send + Sync> RandomAccess<T> for UniformList<T> {
    fn len(&self) -> usize {
        self.count
    }

    fn get(&self, index: usize) -> Result<Arc<T>> {
        if index >= self.count {
            return Err(DictError::invalid_parameter(format!(
                "list index {} out of range 0..{}",
                index, self.count
            )));
        }
        let offset = self.data_start + (index * self.width) as u64;
        let mut reader = SectionReader::new(Arc::clone(&self.file), offset);
        let value = (self.read_elem)(&mut reader, self.version)?;
        Ok(Arc::new(value))
    }
}

/// Writes `list` in the fixed-width layout, verifying that every element
/// occupies exactly `width` bytes.
pub fn write_uniform<T, W, F>(
    out: &mut W,
    list: &dyn RandomAccess<T>,
    width: usize,
    mut write_elem: F,
) -> Result<()>
where
    W: Write + Seek,
    F: FnMut(&mut W, &T) -> Result<()>,
{
    out.write_i32::<BigEndian>(list.len() as i32)?;
    out.write_i32::<BigEndian>(width as i32)?;
    for i in 0..list.len() {
        let elem = list.get(i)?;
        let before = out.stream_position()?;
        write_elem(out, &elem)?;
        let written = out.stream_position()? - before;
        if written != width as u64 {
            return Err(DictError::invalid_parameter(format!(
                "uniform element {} wrote {} bytes, expected {}",
                i, written, width
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::caching_list::VecList;
    use std::io::Cursor;

    fn fixture(values: &[u32]) -> (tempfile::NamedTempFile, Arc<DictFile>) {
        let mut cursor = Cursor::new(Vec::new());
        let list = VecList::from_vec(values.to_vec());
        write_uniform(&mut cursor, &list, 4, |w, v| {
            w.write_u32::<BigEndian>(*v)?;
            Ok(())
        })
        .expect("write");
        let tmp = tempfile::NamedTempFile::new().expect("temp");
        std::fs::write(tmp.path(), cursor.into_inner()).expect("write file");
        let file = DictFile::open(tmp.path()).expect("open");
        (tmp, file)
    }

    fn open_u32(file: &Arc<DictFile>, width: usize) -> Result<UniformList<u32>> {
        UniformList::open(
            Arc::clone(file),
            0,
            7,
            width,
            Box::new(|r, _| Ok(r.read_u32::<BigEndian>()?)),
        )
    }

    #[test]
    fn strided_access() {
        let (_tmp, file) = fixture(&[7, 11, 13]);
        let list = open_u32(&file, 4).expect("open");
        assert_eq!(list.len(), 3);
        assert_eq!(*list.get(2).expect("get"), 13);
        assert_eq!(*list.get(0).expect("get"), 7);
        assert_eq!(list.end_offset(), file.len());
        assert!(list.get(3).is_err());
    }

    #[test]
    fn unexpected_width_is_refused() {
        let (_tmp, file) = fixture(&[1]);
        let err = open_u32(&file, 5).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn truncated_data_is_corrupt() {
        let (_tmp, file) = fixture(&[1, 2, 3]);
        let mut bytes = vec![0u8; file.len() as usize];
        file.read_at(0, &mut bytes).expect("read");
        let tmp = tempfile::NamedTempFile::new().expect("temp");
        std::fs::write(tmp.path(), &bytes[..bytes.len() - 2]).expect("truncate");
        let short = DictFile::open(tmp.path()).expect("open");
        let err = UniformList::<u32>::open(
            short,
            0,
            7,
            4,
            Box::new(|r, _| Ok(r.read_u32::<BigEndian>()?)),
        )
        .unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn writer_rejects_width_mismatch() {
        let mut cursor = Cursor::new(Vec::new());
        let list = VecList::from_vec(vec![1u32]);
        let err = write_uniform(&mut cursor, &list, 5, |w, v| {
            w.write_u32::<BigEndian>(*v)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, DictError::InvalidParameter { .. }));
    }
}
