//! Gzip support for stored HTML bodies.
//!
//! Bodies are UTF-8 text compressed with gzip; the original uncompressed
//! length is recorded next to the payload and verified on decompression.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::{DictError, Result};

/// Compresses `data` with gzip at the default level.
pub fn gzip_compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompresses `data` and checks the result against the recorded length.
pub fn gzip_decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::with_capacity(expected_len);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| DictError::corrupt(format!("gzip decompression failed: {}", e)))?;
    if out.len() != expected_len {
        return Err(DictError::corrupt(format!(
            "decompressed length {} does not match recorded {}",
            out.len(),
            expected_len
        )));
    }
    Ok(out)
}
