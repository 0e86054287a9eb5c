use std::fmt::Debug;

use parking_lot::{
    MappedRwLockReadGuard,
    MappedRwLockWriteGuard,
    RwLockReadGuard,
    RwLockWriteGuard,
};

use crate::{
    hexdump::{
        Config,
        Hexdump,
    },
    source::{
        IntoWindow,
        WriteSource,
    },
    Buffer,
    Length,
    OutOfRange,
    Range,
    Slice,
};

/// A window `offset..offset + length` into a [`Buffer`].
///
/// This is the normalized representation every view variant is built from.
/// All offsets stored here are absolute, i.e. relative to the start of the
/// buffer, so nesting views only ever composes offsets once, when the window
/// is created.
///
/// Invariant: `offset + length <= buffer.len()`.
#[derive(Clone, Default)]
pub struct Window {
    buffer: Buffer,
    offset: usize,
    length: usize,
}

impl Window {
    /// Creates a window from any [`IntoWindow`] source, restricted to
    /// `offset..offset + length` of that source.
    ///
    /// If `length` is `None` the window extends to the end of the source. Byte
    /// counts allocate a fresh buffer and ignore `offset` and `length`.
    #[inline]
    pub fn new(
        source: impl IntoWindow,
        offset: usize,
        length: Option<usize>,
    ) -> Result<Self, OutOfRange> {
        source.into_window_at(offset, length)
    }

    /// Creates a window covering the whole `buffer`.
    #[inline]
    pub fn whole(buffer: Buffer) -> Self {
        Self {
            offset: 0,
            length: buffer.len(),
            buffer,
        }
    }

    #[inline]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Absolute offset of this window in its buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Resolves a range relative to this window into an absolute
    /// `(offset, length)` pair in the buffer.
    ///
    /// Every accessor goes through this.
    #[inline]
    pub fn resolve(&self, range: impl Into<Range>) -> Result<(usize, usize), OutOfRange> {
        let (start, end) = range.into().indices_checked_in(self.offset, self.end())?;
        Ok((start, end - start))
    }

    /// Returns a window into the same buffer for `range` relative to this
    /// window.
    pub fn narrow(&self, range: impl Into<Range>) -> Result<Self, OutOfRange> {
        let (offset, length) = self.resolve(range)?;
        tracing::trace!(offset, length, parent_offset = self.offset, "narrow window");
        Ok(Self {
            buffer: self.buffer.clone(),
            offset,
            length,
        })
    }

    /// Locks the buffer for reading and returns the bytes of this window.
    #[inline]
    pub fn read(&self) -> MappedRwLockReadGuard<'_, [u8]> {
        RwLockReadGuard::map(self.buffer.read(), |bytes| {
            &bytes[self.offset..self.offset + self.length]
        })
    }

    /// Locks the buffer for writing and returns the bytes of this window.
    #[inline]
    pub fn write(&self) -> MappedRwLockWriteGuard<'_, [u8]> {
        RwLockWriteGuard::map(self.buffer.write(), |bytes| {
            &mut bytes[self.offset..self.offset + self.length]
        })
    }

    pub fn get_byte(&self, index: usize) -> Result<u8, OutOfRange> {
        let (offset, _) = self.resolve(index)?;
        Ok(self.buffer.read()[offset])
    }

    /// Returns a [`Slice`] of `range` that shares memory with this window.
    #[inline]
    pub fn slice(&self, range: impl Into<Range>) -> Result<Slice, OutOfRange> {
        Ok(Slice::from_window(self.narrow(range)?))
    }

    /// Copies the bytes in `range` into a new [`Vec`].
    pub fn copy(&self, range: impl Into<Range>) -> Result<Vec<u8>, OutOfRange> {
        let (offset, length) = self.resolve(range)?;
        Ok(self.buffer.read()[offset..][..length].to_vec())
    }

    /// Copies `source` into this window, starting at `offset`.
    ///
    /// Bytes that don't fit between `offset` and the end of the window are
    /// silently dropped. `offset` itself must lie inside the window.
    pub fn write_at<S: WriteSource + ?Sized>(
        &self,
        source: &S,
        offset: usize,
    ) -> Result<(), OutOfRange> {
        if offset >= self.length {
            return Err(OutOfRange {
                required: Range::from(offset..),
                bounds: (self.offset, self.end()),
            });
        }

        let amount = std::cmp::min(source.len(), self.length - offset);
        let (start, _) = self.resolve(Range::at(offset, Some(amount)))?;

        if amount < source.len() {
            tracing::debug!(
                source_length = source.len(),
                written = amount,
                "source doesn't fit into view; clipping"
            );
        }

        match source.backing() {
            Some((buffer, source_offset)) if buffer.ptr_eq(&self.buffer) => {
                // same memory, so we must not lock twice. this also handles overlapping ranges.
                self.buffer
                    .write()
                    .copy_within(source_offset..source_offset + amount, start);
            }
            Some((buffer, source_offset)) => {
                // buffers are always locked in address order.
                let source_bytes;
                let mut bytes;
                if buffer.addr() < self.buffer.addr() {
                    source_bytes = buffer.read();
                    bytes = self.buffer.write();
                }
                else {
                    bytes = self.buffer.write();
                    source_bytes = buffer.read();
                }
                bytes[start..][..amount].copy_from_slice(&source_bytes[source_offset..][..amount]);
            }
            None => {
                let mut bytes = self.buffer.write();
                source.copy_to(&mut bytes[start..][..amount]);
            }
        }

        Ok(())
    }

    /// Runs `f` with exclusive access to exactly the bytes of this window,
    /// e.g. as the destination of a file read.
    ///
    /// The buffer is locked only while `f` runs. Once this returns, everything
    /// `f` wrote is visible through all views of the buffer. `f` must not
    /// access the same buffer through a view.
    #[inline]
    pub fn with_direct_target<T>(&self, f: impl FnOnce(&mut [u8]) -> T) -> T {
        let mut bytes = self.write();
        f(&mut bytes[..])
    }
}

impl Length for Window {
    #[inline]
    fn len(&self) -> usize {
        self.length
    }
}

impl Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        debug_window(f, "Window", self)
    }
}

/// Shared [`Debug`] implementation of everything that wraps a [`Window`].
pub(crate) fn debug_window(
    f: &mut std::fmt::Formatter<'_>,
    name: &str,
    window: &Window,
) -> std::fmt::Result {
    let mut s = f.debug_struct(name);
    s.field("offset", &window.offset)
        .field("length", &window.length);
    // don't deadlock if the buffer is locked for writing.
    if let Some(bytes) = window.buffer.try_read() {
        s.field(
            "bytes",
            &Hexdump::with_config(&bytes[window.offset..window.end()], Config::debug(window.offset)),
        );
    }
    s.finish()
}
