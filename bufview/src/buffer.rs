use std::{
    fmt::Debug,
    sync::Arc,
};

use parking_lot::{
    RwLock,
    RwLockReadGuard,
    RwLockWriteGuard,
};

use crate::{
    hexdump::Hexdump,
    Length,
};

/// Fixed-size backing memory shared by any number of views.
///
/// Cloning a [`Buffer`] is cheap and yields another handle to the same bytes.
/// The memory is freed once the last handle (including the ones held by views
/// and slices) is dropped.
#[derive(Clone)]
pub struct Buffer {
    // the length is cached, since the boxed slice never changes its length.
    len: usize,
    bytes: Arc<RwLock<Box<[u8]>>>,
}

impl Buffer {
    /// Allocates `len` zeroed bytes.
    #[inline]
    pub fn new(len: usize) -> Self {
        Self::from(vec![0u8; len].into_boxed_slice())
    }

    /// Locks the buffer for reading and returns all of its bytes.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Box<[u8]>> {
        self.bytes.read()
    }

    /// Locks the buffer for writing and returns all of its bytes.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, Box<[u8]>> {
        self.bytes.write()
    }

    /// Returns whether both handles refer to the same memory.
    #[inline]
    pub fn ptr_eq(&self, other: &Buffer) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    /// Number of handles (buffers, views, slices) keeping this memory alive.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.bytes)
    }

    /// Locks the buffer for reading, unless it's currently locked for writing.
    #[inline]
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, Box<[u8]>>> {
        self.bytes.try_read()
    }

    /// Address of the shared allocation. Buffers are locked in this order
    /// when more than one is needed.
    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.bytes) as usize
    }
}

impl Default for Buffer {
    /// Creates an empty [`Buffer`].
    #[inline]
    fn default() -> Self {
        Self::new(0)
    }
}

impl Length for Buffer {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}

impl From<Box<[u8]>> for Buffer {
    #[inline]
    fn from(value: Box<[u8]>) -> Self {
        Self {
            len: value.len(),
            bytes: Arc::new(RwLock::new(value)),
        }
    }
}

impl From<Vec<u8>> for Buffer {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Self::from(value.into_boxed_slice())
    }
}

impl<const N: usize> From<[u8; N]> for Buffer {
    #[inline]
    fn from(value: [u8; N]) -> Self {
        Self::from(Box::<[u8]>::from(value))
    }
}

impl<'a> From<&'a [u8]> for Buffer {
    /// Copies the bytes into a newly allocated [`Buffer`].
    #[inline]
    fn from(value: &'a [u8]) -> Self {
        Self::from(Box::<[u8]>::from(value))
    }
}

impl Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Buffer");
        s.field("len", &self.len)
            .field("ref_count", &self.ref_count());
        if let Some(bytes) = self.bytes.try_read() {
            s.field("bytes", &Hexdump::new(&**bytes));
        }
        s.finish()
    }
}
