//! Tab-separated input helpers
//!
//! Columns are located by header name, so extra columns and any column
//! order are accepted.

use super::{LoadError, LoadResult};
use sha2::{Digest, Sha256};
use std::io::{self, Read};

/// Build a reader for a headered, tab-delimited file.
///
/// Quoting is disabled: names in the source data contain bare `"` and `'`
/// characters that must be taken literally. Only header names are trimmed;
/// field values are kept exactly as written.
pub(crate) fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::Headers)
        .from_reader(reader)
}

/// Resolve the index of every required column, failing on the first absent one.
pub(crate) fn locate_columns<const N: usize>(
    headers: &csv::StringRecord,
    file: &str,
    required: [&'static str; N],
) -> LoadResult<[usize; N]> {
    let mut indices = [0usize; N];
    for (slot, column) in indices.iter_mut().zip(required) {
        *slot = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(column))
            .ok_or_else(|| LoadError::MissingColumn {
                file: file.to_string(),
                column,
            })?;
    }
    Ok(indices)
}

/// Fetch a field that must be present and not blank.
pub(crate) fn required_field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    column: &str,
    file: &str,
) -> LoadResult<&'r str> {
    match record.get(index) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(LoadError::MalformedRow {
            file: file.to_string(),
            line: line_of(record),
            reason: format!("empty '{}' field", column),
        }),
        None => Err(LoadError::MalformedRow {
            file: file.to_string(),
            line: line_of(record),
            reason: format!("missing '{}' field", column),
        }),
    }
}

pub(crate) fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Reader adapter that hashes every byte passing through it.
pub struct DigestReader<R> {
    inner: R,
    hasher: Sha256,
}

impl<R: Read> DigestReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Hex SHA-256 of everything read so far
    pub fn finalize_hex(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

impl<R: Read> Read for DigestReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}
