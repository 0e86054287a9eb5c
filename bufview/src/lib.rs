//! Bounds-checked views over shared memory.
//!
//! A [`BufferView`] is a window into a [`Buffer`]. Sub-views derived from it
//! alias the same memory, at any depth, without copying; writes through any of
//! them are visible through all of them. File and stream reads (see [`io`])
//! land in the view's memory directly.
//!
//! Specialized views implement [`View`], and everything derived from them
//! keeps their type:
//!
//! ```
//! use bufview::{
//!     BufferView,
//!     View,
//! };
//!
//! let view = BufferView::new(vec![0, 1, 2, 3, 4, 5]);
//! let sub = view.subarray(1, Some(4)).unwrap();
//! assert_eq!(sub.get_byte(0).unwrap(), 1);
//!
//! let chunk = view.get_bytes(1, Some(4)).unwrap();
//! chunk.set(1, 98).unwrap();
//! assert_eq!(view.to_vec(), [0, 1, 98, 3, 4, 5]);
//! ```

mod buffer;
pub mod hexdump;
pub mod io;
mod range;
mod slice;
pub mod source;
mod view;
mod window;

pub use self::{
    buffer::Buffer,
    range::{
        OutOfRange,
        Range,
    },
    slice::Slice,
    source::{
        IntoWindow,
        WriteSource,
    },
    view::{
        BufferView,
        DynView,
        View,
    },
    window::Window,
};

pub trait Length {
    /// Returns the length in bytes.
    fn len(&self) -> usize;

    /// Returns whether the length is 0.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Length for [u8] {
    #[inline]
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }
}

impl<const N: usize> Length for [u8; N] {
    #[inline]
    fn len(&self) -> usize {
        N
    }
}

impl Length for Vec<u8> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl<'a, T: Length + ?Sized> Length for &'a T {
    #[inline]
    fn len(&self) -> usize {
        T::len(self)
    }
}

impl<T: Length + ?Sized> Length for Box<T> {
    #[inline]
    fn len(&self) -> usize {
        T::len(self)
    }
}
