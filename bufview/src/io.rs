//! Reading from files and streams directly into views.

use crate::{
    Length,
    OutOfRange,
    Range,
    View,
};

/// Error returned when reading into a view.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),

    /// The reader failed. The error is passed through as is.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A source that can read into a buffer at a given position, without a
/// cursor.
pub trait ReadAt {
    /// Reads bytes starting at `position` into `buf` and returns how many
    /// bytes were read.
    fn read_at(&self, buf: &mut [u8], position: u64) -> std::io::Result<usize>;
}

#[cfg(unix)]
impl ReadAt for std::fs::File {
    #[inline]
    fn read_at(&self, buf: &mut [u8], position: u64) -> std::io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, position)
    }
}

#[cfg(windows)]
impl ReadAt for std::fs::File {
    #[inline]
    fn read_at(&self, buf: &mut [u8], position: u64) -> std::io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, position)
    }
}

impl ReadAt for [u8] {
    fn read_at(&self, buf: &mut [u8], position: u64) -> std::io::Result<usize> {
        let Some(bytes) = usize::try_from(position)
            .ok()
            .and_then(|position| self.get(position..))
        else {
            return Ok(0);
        };
        let n = std::cmp::min(bytes.len(), buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        Ok(n)
    }
}

impl<'a, T: ReadAt + ?Sized> ReadAt for &'a T {
    #[inline]
    fn read_at(&self, buf: &mut [u8], position: u64) -> std::io::Result<usize> {
        T::read_at(self, buf, position)
    }
}

/// Reads from `source` at `position` into `offset..offset + length` of
/// `view`.
///
/// This is a single read, which might read fewer bytes than requested. The
/// number of bytes read is returned. The bytes land in the view's memory
/// directly, and are visible through all views of it once this returns.
pub fn read_at<V: View, R: ReadAt + ?Sized>(
    view: &V,
    source: &R,
    offset: usize,
    length: Option<usize>,
    position: u64,
) -> Result<usize, ReadError> {
    let window = view.window().narrow(Range::at(offset, length))?;
    let n = window.with_direct_target(|bytes| source.read_at(bytes, position))?;
    tracing::debug!(
        offset = window.offset(),
        requested = window.len(),
        read = n,
        position,
        "read into view"
    );
    Ok(n)
}

/// Fills `offset..offset + length` of `view` from `reader`.
///
/// The view's buffer is locked while reading.
pub fn read_exact<V: View, R: std::io::Read + ?Sized>(
    view: &V,
    reader: &mut R,
    offset: usize,
    length: Option<usize>,
) -> Result<(), ReadError> {
    let window = view.window().narrow(Range::at(offset, length))?;
    window.with_direct_target(|bytes| reader.read_exact(bytes))?;
    tracing::debug!(offset = window.offset(), read = window.len(), "read into view");
    Ok(())
}

/// Fills `offset..offset + length` of `view` from an async `reader`.
///
/// The buffer isn't locked while the read is pending. The bytes are read into
/// a temporary buffer first and copied into the view once the read completes,
/// so on error the view is left untouched.
#[cfg(feature = "tokio")]
pub async fn read_exact_async<V: View, R: tokio::io::AsyncRead + Unpin>(
    view: &V,
    reader: &mut R,
    offset: usize,
    length: Option<usize>,
) -> Result<(), ReadError> {
    use tokio::io::AsyncReadExt as _;

    let window = view.window().narrow(Range::at(offset, length))?;
    let mut buf = vec![0u8; window.len()];
    reader.read_exact(&mut buf).await?;
    window.with_direct_target(|bytes| bytes.copy_from_slice(&buf));
    tracing::debug!(offset = window.offset(), read = buf.len(), "read into view");
    Ok(())
}
