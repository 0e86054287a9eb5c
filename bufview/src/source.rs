//! What views can be created from, and what can be written into them.

use crate::{
    Buffer,
    BufferView,
    Length,
    OutOfRange,
    Range,
    Slice,
    View,
    Window,
};

/// Anything a view can be constructed from.
///
/// Implementors only provide [`into_window`](Self::into_window). The default
/// [`into_window_at`](Self::into_window_at) then restricts that window, which
/// composes offsets for sources that already are windows into a buffer.
pub trait IntoWindow: Sized {
    fn into_window(self) -> Window;

    fn into_window_at(self, offset: usize, length: Option<usize>) -> Result<Window, OutOfRange> {
        self.into_window().narrow(Range::at(offset, length))
    }
}

impl IntoWindow for usize {
    /// Allocates a zeroed buffer of this many bytes.
    #[inline]
    fn into_window(self) -> Window {
        tracing::trace!(length = self, "allocate buffer");
        Window::whole(Buffer::new(self))
    }

    /// A fresh allocation is always viewed as a whole, so `offset` and `length`
    /// are ignored.
    #[inline]
    fn into_window_at(self, _offset: usize, _length: Option<usize>) -> Result<Window, OutOfRange> {
        Ok(self.into_window())
    }
}

impl IntoWindow for Buffer {
    #[inline]
    fn into_window(self) -> Window {
        Window::whole(self)
    }
}

impl IntoWindow for Window {
    #[inline]
    fn into_window(self) -> Window {
        self
    }
}

impl IntoWindow for Slice {
    #[inline]
    fn into_window(self) -> Window {
        self.into_inner()
    }
}

impl<'a, V: View> IntoWindow for &'a V {
    #[inline]
    fn into_window(self) -> Window {
        self.window().clone()
    }
}

macro_rules! impl_into_window_via_buffer {
    {
        $(
            ($($generics:tt)*), $ty:ty;
        )*
    } => {
        $(
            impl<$($generics)*> IntoWindow for $ty {
                #[inline]
                fn into_window(self) -> Window {
                    Window::whole(Buffer::from(self))
                }
            }
        )*
    };
}

impl_into_window_via_buffer! {
    (), Vec<u8>;
    (), Box<[u8]>;
    (const N: usize), [u8; N];
}

/// Anything that can be written into a view.
///
/// If the source is itself backed by a [`Buffer`], it must say so through
/// [`backing`](Self::backing). Writing locks the destination buffer, so a
/// source that reads from that same buffer in
/// [`copy_to`](Self::copy_to) would deadlock.
pub trait WriteSource: Length {
    /// Copies the first `destination.len()` bytes of this source into
    /// `destination`.
    ///
    /// `destination.len()` is never greater than `self.len()`.
    fn copy_to(&self, destination: &mut [u8]);

    /// Returns the buffer this source reads from and the absolute offset of
    /// its first byte.
    #[inline]
    fn backing(&self) -> Option<(&Buffer, usize)> {
        None
    }
}

impl WriteSource for [u8] {
    #[inline]
    fn copy_to(&self, destination: &mut [u8]) {
        destination.copy_from_slice(&self[..destination.len()]);
    }
}

impl<const N: usize> WriteSource for [u8; N] {
    #[inline]
    fn copy_to(&self, destination: &mut [u8]) {
        self[..].copy_to(destination);
    }
}

impl WriteSource for Vec<u8> {
    #[inline]
    fn copy_to(&self, destination: &mut [u8]) {
        self[..].copy_to(destination);
    }
}

impl WriteSource for Buffer {
    #[inline]
    fn copy_to(&self, destination: &mut [u8]) {
        destination.copy_from_slice(&self.read()[..destination.len()]);
    }

    #[inline]
    fn backing(&self) -> Option<(&Buffer, usize)> {
        Some((self, 0))
    }
}

impl WriteSource for Window {
    #[inline]
    fn copy_to(&self, destination: &mut [u8]) {
        destination.copy_from_slice(&self.read()[..destination.len()]);
    }

    #[inline]
    fn backing(&self) -> Option<(&Buffer, usize)> {
        Some((self.buffer(), self.offset()))
    }
}

impl WriteSource for Slice {
    #[inline]
    fn copy_to(&self, destination: &mut [u8]) {
        self.as_window().copy_to(destination);
    }

    #[inline]
    fn backing(&self) -> Option<(&Buffer, usize)> {
        self.as_window().backing()
    }
}

impl WriteSource for BufferView {
    #[inline]
    fn copy_to(&self, destination: &mut [u8]) {
        self.window().copy_to(destination);
    }

    #[inline]
    fn backing(&self) -> Option<(&Buffer, usize)> {
        self.window().backing()
    }
}

impl<'a, T: WriteSource + ?Sized> WriteSource for &'a T {
    #[inline]
    fn copy_to(&self, destination: &mut [u8]) {
        T::copy_to(self, destination)
    }

    #[inline]
    fn backing(&self) -> Option<(&Buffer, usize)> {
        T::backing(self)
    }
}
