//! In-memory ZIP access.
//!
//! Entries that are not rewritten are copied raw, without recompression, so
//! they come out byte-identical. New and rewritten entries use a fixed
//! timestamp, making output reproducible for identical input.

use std::io::{Cursor, Read, Write};

use zip::{
    CompressionMethod, DateTime, ZipArchive, ZipWriter,
    result::{ZipError, ZipResult},
    write::SimpleFileOptions,
};

/// Read access to an archive held in memory.
pub struct ArchiveReader<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> ArchiveReader<'a> {
    pub fn new(bytes: &'a [u8]) -> ZipResult<Self> {
        Ok(Self {
            archive: ZipArchive::new(Cursor::new(bytes))?,
        })
    }

    /// Entry names in archive order.
    pub fn names(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|idx| self.archive.name_for_index(idx).map(str::to_string))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Reads an entry, or `None` if it does not exist.
    pub fn read(&mut self, name: &str) -> ZipResult<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(err),
        };
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)?;
        Ok(Some(buf))
    }

    fn copy_raw(&mut self, index: usize, writer: &mut ArchiveWriter) -> ZipResult<()> {
        let file = self.archive.by_index_raw(index)?;
        writer.inner.raw_copy_file(file)
    }
}

/// Write access to an archive built in memory.
pub struct ArchiveWriter {
    inner: ZipWriter<Cursor<Vec<u8>>>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            inner: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
    }

    /// Writes a new entry with deterministic metadata.
    pub fn write(&mut self, name: &str, bytes: &[u8]) -> ZipResult<()> {
        self.inner.start_file(name, Self::options())?;
        self.inner.write_all(bytes)?;
        Ok(())
    }

    /// Copies every entry of `reader`, in order, swapping in `replacement`
    /// output for the entries it returns `Some` for.
    pub fn copy_from<F>(&mut self, reader: &mut ArchiveReader<'_>, mut replacement: F) -> ZipResult<()>
    where
        F: FnMut(&str) -> Option<Vec<u8>>,
    {
        for (index, name) in reader.names().into_iter().enumerate() {
            match replacement(&name) {
                Some(bytes) => self.write(&name, &bytes)?,
                None => reader.copy_raw(index, self)?,
            }
        }
        Ok(())
    }

    pub fn finish(self) -> ZipResult<Vec<u8>> {
        Ok(self.inner.finish()?.into_inner())
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}
