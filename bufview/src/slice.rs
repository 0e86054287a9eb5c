use std::fmt::Debug;

use parking_lot::{
    MappedRwLockReadGuard,
    MappedRwLockWriteGuard,
};

use crate::{
    window::debug_window,
    Length,
    OutOfRange,
    Window,
};

/// A live slice of a view's memory.
///
/// Unlike a view, a [`Slice`] has no variant of its own and can't be derived
/// from further; it's meant for transient access to a run of bytes. It
/// doesn't copy: writes through a [`Slice`] are visible to every view of the
/// same buffer, and vice versa.
#[derive(Clone, Default)]
pub struct Slice {
    window: Window,
}

impl Slice {
    #[inline]
    pub(crate) fn from_window(window: Window) -> Self {
        Self { window }
    }

    #[inline]
    pub fn as_window(&self) -> &Window {
        &self.window
    }

    #[inline]
    pub fn into_inner(self) -> Window {
        self.window
    }

    #[inline]
    pub fn get(&self, index: usize) -> Result<u8, OutOfRange> {
        self.window.get_byte(index)
    }

    pub fn set(&self, index: usize, value: u8) -> Result<(), OutOfRange> {
        let (offset, _) = self.window.resolve(index)?;
        self.window.buffer().write()[offset] = value;
        Ok(())
    }

    /// Locks the buffer for reading and returns the bytes of this slice.
    #[inline]
    pub fn read(&self) -> MappedRwLockReadGuard<'_, [u8]> {
        self.window.read()
    }

    /// Locks the buffer for writing and returns the bytes of this slice.
    #[inline]
    pub fn write(&self) -> MappedRwLockWriteGuard<'_, [u8]> {
        self.window.write()
    }

    #[inline]
    pub fn to_vec(&self) -> Vec<u8> {
        self.read().to_vec()
    }
}

impl Length for Slice {
    #[inline]
    fn len(&self) -> usize {
        self.window.len()
    }
}

impl Debug for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        debug_window(f, "Slice", &self.window)
    }
}
