//! Archive access and image resolution
//!
//! [`Archive`] wraps a `zip` reader so it can be shared by the tree builder's
//! workers. `ZipArchive` needs `&mut` to read an entry, so the reader sits
//! behind a mutex that is held for the lookup and byte copy only. PNG decoding
//! happens after the lock is released and runs in parallel.

use crate::error::{OraError, OraResult};
use image::{ImageFormat, RgbaImage};
use parking_lot::Mutex;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Upper bound on the buffer reserved up front from an entry's declared size
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// Shared, read-only view of an opened container archive
#[derive(Debug)]
pub struct Archive<R> {
    inner: Mutex<ZipArchive<R>>,
}

impl<R: Read + Seek> Archive<R> {
    /// Open archive from a seekable byte source
    ///
    /// # Errors
    /// `OraError::ContainerOpen` if the central directory cannot be read
    pub fn open(reader: R) -> OraResult<Self> {
        let zip = ZipArchive::new(reader).map_err(OraError::ContainerOpen)?;
        Ok(Self {
            inner: Mutex::new(zip),
        })
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if archive has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry names in archive-listing order
    #[must_use]
    pub fn entry_names(&self) -> Vec<String> {
        let zip = self.inner.lock();
        (0..zip.len())
            .filter_map(|index| zip.name_for_index(index).map(str::to_string))
            .collect()
    }

    /// Check if an entry with this exact name exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        find_entry(&*self.inner.lock(), name).is_some()
    }

    /// Read an entry's bytes
    ///
    /// Entries are matched by exact name, scanning in listing order; the
    /// first match wins.
    ///
    /// # Errors
    /// - `OraError::EntryNotFound` if no entry has this name
    /// - `OraError::EntryRead` if the entry cannot be decompressed
    pub fn read_entry(&self, name: &str) -> OraResult<Vec<u8>> {
        let mut zip = self.inner.lock();
        let index = find_entry(&*zip, name).ok_or_else(|| OraError::entry_not_found(name))?;

        let mut file = zip
            .by_index(index)
            .map_err(|e| OraError::entry_read(name, e))?;
        let mut bytes = Vec::with_capacity(prealloc_len(file.size()));
        file.read_to_end(&mut bytes)
            .map_err(|e| OraError::entry_read(name, e))?;

        Ok(bytes)
    }

    /// Locate and decode a layer raster
    ///
    /// # Errors
    /// - `OraError::EntryNotFound` if `src` names no entry
    /// - `OraError::EntryRead` if the entry cannot be read
    /// - `OraError::DecodeFailure` if the bytes are not a valid PNG
    pub fn resolve_image(&self, src: &str) -> OraResult<RgbaImage> {
        let bytes = self.read_entry(src)?;
        decode_png(src, &bytes)
    }
}

/// Initial buffer size for an entry; headers are untrusted, `read_to_end`
/// grows the buffer past the cap when the data is really there
fn prealloc_len(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOC)).unwrap_or(0)
}

fn find_entry<R: Read + Seek>(zip: &ZipArchive<R>, name: &str) -> Option<usize> {
    (0..zip.len()).find(|&index| zip.name_for_index(index) == Some(name))
}

/// Decode PNG bytes into an RGBA8 buffer
///
/// # Errors
/// `OraError::DecodeFailure` tagged with `path` if decoding fails
pub fn decode_png(path: &str, bytes: &[u8]) -> OraResult<RgbaImage> {
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map(image::DynamicImage::into_rgba8)
        .map_err(|e| OraError::decode_failure(path, e))
}
