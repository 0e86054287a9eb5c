use std::{
    any::Any,
    fmt::Debug,
};

use crate::{
    source::{
        IntoWindow,
        WriteSource,
    },
    window::debug_window,
    Buffer,
    Length,
    OutOfRange,
    Range,
    Slice,
    Window,
};

/// A bounds-checked window over shared memory.
///
/// A view variant only has to say how it's constructed from a [`Window`] and
/// how to get its window back. Everything else is provided, and every method
/// that derives a new view returns `Self`, so a specialized view stays
/// specialized when sub-viewed:
///
/// ```
/// # use bufview::{View, Window};
/// #[derive(Clone)]
/// struct TagView(Window);
///
/// impl View for TagView {
///     fn from_window(window: Window) -> Self {
///         Self(window)
///     }
///
///     fn window(&self) -> &Window {
///         &self.0
///     }
/// }
///
/// let tag = TagView(Window::new(vec![0u8, 1, 2, 3], 0, None).unwrap());
/// let payload: TagView = tag.subarray(1, None).unwrap();
/// assert_eq!(payload.to_vec(), [1, 2, 3]);
/// ```
///
/// All views of a buffer alias the same memory. The buffer is behind a lock,
/// which is taken for the duration of each call. Guards returned from
/// [`Window::read`] and [`Window::write`] hold that lock until they are
/// dropped, so don't access the same buffer from the same thread while holding
/// one.
pub trait View: Sized {
    /// Constructs this variant from a window.
    fn from_window(window: Window) -> Self;

    fn window(&self) -> &Window;

    /// Absolute offset of this view in its backing buffer.
    #[inline]
    fn byte_offset(&self) -> usize {
        self.window().offset()
    }

    #[inline]
    fn byte_length(&self) -> usize {
        self.window().len()
    }

    /// The backing buffer.
    #[inline]
    fn buffer(&self) -> &Buffer {
        self.window().buffer()
    }

    /// Returns a view of the same variant for `range`, sharing memory with
    /// this view.
    #[inline]
    fn view(&self, range: impl Into<Range>) -> Result<Self, OutOfRange> {
        Ok(Self::from_window(self.window().narrow(range)?))
    }

    /// Returns a view of the same variant for `offset..offset + length`,
    /// sharing memory with this view.
    ///
    /// If `length` is `None`, the sub-view extends to the end of this view.
    #[inline]
    fn subarray(&self, offset: usize, length: Option<usize>) -> Result<Self, OutOfRange> {
        self.view(Range::at(offset, length))
    }

    #[inline]
    fn get_byte(&self, index: usize) -> Result<u8, OutOfRange> {
        self.window().get_byte(index)
    }

    /// Returns a [`Slice`] of `offset..offset + length` that shares memory
    /// with this view.
    #[inline]
    fn get_bytes(&self, offset: usize, length: Option<usize>) -> Result<Slice, OutOfRange> {
        self.window().slice(Range::at(offset, length))
    }

    /// Copies `source` into this view at `offset`.
    ///
    /// The view never grows: if `source` is longer than the rest of the view,
    /// only the bytes that fit are written. Fails if `offset` doesn't lie
    /// inside the view, in which case nothing is written.
    #[inline]
    fn write<S: WriteSource + ?Sized>(&self, source: &S, offset: usize) -> Result<(), OutOfRange> {
        self.window().write_at(source, offset)
    }

    /// Returns a standalone copy of `offset..offset + length`.
    ///
    /// The copy doesn't alias this view.
    #[inline]
    fn copy(&self, offset: usize, length: Option<usize>) -> Result<Vec<u8>, OutOfRange> {
        self.window().copy(Range::at(offset, length))
    }

    /// Returns a standalone copy of the whole view.
    #[inline]
    fn to_vec(&self) -> Vec<u8> {
        self.window().read().to_vec()
    }

    /// Copies the bytes of another view into this view at `offset`.
    ///
    /// Same as [`write`](Self::write), for any view variant.
    #[inline]
    fn write_view<V: View>(&self, source: &V, offset: usize) -> Result<(), OutOfRange> {
        self.window().write_at(source.window(), offset)
    }

    /// Exposes this view's bytes to an external writer, e.g. a file read.
    ///
    /// `f` gets exactly the bytes of this view, without copying. See
    /// [`Window::with_direct_target`].
    #[inline]
    fn with_direct_target<T>(&self, f: impl FnOnce(&mut [u8]) -> T) -> T {
        self.window().with_direct_target(f)
    }
}

/// The base view variant.
#[derive(Clone, Default)]
pub struct BufferView {
    window: Window,
}

impl BufferView {
    /// Creates a view over all of `source`.
    ///
    /// A byte count allocates a zeroed buffer of that size.
    #[inline]
    pub fn new(source: impl IntoWindow) -> Self {
        Self::from_window(source.into_window())
    }

    /// Creates a view over `offset..offset + length` of `source`.
    ///
    /// If `length` is `None`, the view extends to the end of `source`. A byte
    /// count allocates a zeroed buffer and ignores `offset` and `length`.
    #[inline]
    pub fn with_window(
        source: impl IntoWindow,
        offset: usize,
        length: Option<usize>,
    ) -> Result<Self, OutOfRange> {
        Ok(Self::from_window(Window::new(source, offset, length)?))
    }
}

impl View for BufferView {
    #[inline]
    fn from_window(window: Window) -> Self {
        Self { window }
    }

    #[inline]
    fn window(&self) -> &Window {
        &self.window
    }
}

impl Length for BufferView {
    #[inline]
    fn len(&self) -> usize {
        self.window.len()
    }
}

impl Debug for BufferView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        debug_window(f, "BufferView", &self.window)
    }
}

/// Object-safe counterpart of [`View`].
///
/// This is implemented for all views, and is useful if the concrete variant
/// isn't known statically. [`DynView::subarray_dyn`] still constructs the
/// variant of `self`.
pub trait DynView: Any {
    fn dyn_window(&self) -> &Window;

    fn subarray_dyn(
        &self,
        offset: usize,
        length: Option<usize>,
    ) -> Result<Box<dyn DynView>, OutOfRange>;

    fn clone_dyn(&self) -> Box<dyn DynView>;

    fn as_any(&self) -> &dyn Any;
}

impl<V: View + 'static> DynView for V {
    #[inline]
    fn dyn_window(&self) -> &Window {
        self.window()
    }

    #[inline]
    fn subarray_dyn(
        &self,
        offset: usize,
        length: Option<usize>,
    ) -> Result<Box<dyn DynView>, OutOfRange> {
        Ok(Box::new(self.subarray(offset, length)?))
    }

    #[inline]
    fn clone_dyn(&self) -> Box<dyn DynView> {
        Box::new(V::from_window(self.window().clone()))
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clone for Box<dyn DynView> {
    #[inline]
    fn clone(&self) -> Self {
        self.clone_dyn()
    }
}

impl Debug for dyn DynView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        debug_window(f, "DynView", self.dyn_window())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BufferView,
        DynView,
        View,
    };
    use crate::{
        Buffer,
        Length,
        OutOfRange,
        Range,
        Window,
    };

    /// A view variant with behavior of its own.
    #[derive(Clone, Debug)]
    struct TagView {
        window: Window,
    }

    impl TagView {
        fn tag(&self) -> Result<u8, OutOfRange> {
            self.get_byte(0)
        }
    }

    impl View for TagView {
        fn from_window(window: Window) -> Self {
            Self { window }
        }

        fn window(&self) -> &Window {
            &self.window
        }
    }

    fn tag_view(bytes: Vec<u8>) -> TagView {
        TagView::from_window(Window::whole(Buffer::from(bytes)))
    }

    fn buffer_view(bytes: Vec<u8>) -> BufferView {
        BufferView::new(bytes)
    }

    macro_rules! view_tests {
        ($new:expr) => {
            #[allow(unused_imports)]
            use crate::{
                Length as _,
                View as _,
            };

            #[test]
            fn subarray_with_offset_and_length() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                let sub = view.subarray(1, Some(4)).unwrap();
                assert_eq!(sub.byte_length(), 4);
                assert_eq!(sub.get_byte(0).unwrap(), 1);
                assert_eq!(sub.get_byte(3).unwrap(), 4);
            }

            #[test]
            fn subarray_with_offset_only() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                let sub = view.subarray(3, None).unwrap();
                assert_eq!(sub.byte_length(), 3);
                assert_eq!(sub.get_byte(0).unwrap(), 3);
                assert_eq!(sub.get_byte(1).unwrap(), 4);
                assert_eq!(sub.get_byte(2).unwrap(), 5);
            }

            #[test]
            fn subarray_matches_parent_bytes() {
                let view = $new((0..32).collect());
                for offset in 0..=32 {
                    for length in 0..=(32 - offset) {
                        let sub = view.subarray(offset, Some(length)).unwrap();
                        assert_eq!(sub.byte_length(), length);
                        for i in 0..length {
                            assert_eq!(sub.get_byte(i).unwrap(), view.get_byte(offset + i).unwrap());
                        }
                    }
                }
            }

            #[test]
            fn nested_subarrays_compose_offsets() {
                let view = $new((0..16).collect());
                let sub = view.subarray(2, Some(10)).unwrap();
                let sub_sub = sub.subarray(3, Some(4)).unwrap();
                let sub_sub_sub = sub_sub.subarray(1, None).unwrap();
                assert_eq!(sub_sub.byte_offset(), 5);
                assert_eq!(sub_sub_sub.byte_offset(), 6);
                assert_eq!(sub_sub_sub.to_vec(), [6, 7, 8]);
                assert!(sub_sub.subarray(2, Some(3)).is_err());
            }

            #[test]
            fn subarray_out_of_range() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                assert!(view.subarray(7, None).is_err());
                assert!(view.subarray(2, Some(5)).is_err());
                assert!(view.subarray(usize::MAX, Some(2)).is_err());
                assert_eq!(view.subarray(6, None).unwrap().byte_length(), 0);
            }

            #[test]
            fn view_with_ranges() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                assert_eq!(view.view(1..5).unwrap().to_vec(), [1, 2, 3, 4]);
                assert_eq!(view.view(..2).unwrap().to_vec(), [0, 1]);
                assert_eq!(view.view(4..=5).unwrap().to_vec(), [4, 5]);
                assert_eq!(view.view(..).unwrap().byte_length(), 6);
            }

            #[test]
            fn get_byte_out_of_range() {
                let view = $new(vec![0, 1, 2]);
                assert_eq!(view.get_byte(2).unwrap(), 2);
                assert!(view.get_byte(3).is_err());
                let sub = view.subarray(1, Some(1)).unwrap();
                assert!(sub.get_byte(1).is_err());
            }

            #[test]
            fn writes_through_sub_view_are_visible_in_parent() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                let sub = view.subarray(2, Some(3)).unwrap();
                sub.write(&[42u8], 1).unwrap();
                assert_eq!(view.get_byte(3).unwrap(), 42);

                view.write(&[43u8], 4).unwrap();
                assert_eq!(sub.get_byte(2).unwrap(), 43);
            }

            #[test]
            fn get_bytes_shares_memory() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                let chunk = view.get_bytes(1, Some(4)).unwrap();
                assert_eq!(chunk.len(), 4);
                assert_eq!(chunk.to_vec(), [1, 2, 3, 4]);

                chunk.set(1, 98).unwrap();
                chunk.set(3, 99).unwrap();
                assert_eq!(chunk.to_vec(), [1, 98, 3, 99]);
                assert_eq!(view.to_vec(), [0, 1, 98, 3, 99, 5]);
            }

            #[test]
            fn get_bytes_out_of_range() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                assert!(view.get_bytes(4, Some(3)).is_err());
                assert!(view.get_bytes(7, None).is_err());
                assert_eq!(view.get_bytes(6, None).unwrap().len(), 0);

                let sub = view.subarray(1, Some(3)).unwrap();
                assert!(sub.get_bytes(1, Some(3)).is_err());
                assert_eq!(sub.get_bytes(1, None).unwrap().to_vec(), [2, 3]);
            }

            #[test]
            fn get_bytes_has_no_side_effects() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                view.get_bytes(1, Some(4)).unwrap();
                assert_eq!(view.byte_length(), 6);
                assert_eq!(view.to_vec(), [0, 1, 2, 3, 4, 5]);
            }

            #[test]
            fn write_inserts_at_offset() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                view.write(&[7u8, 8, 9], 2).unwrap();
                assert_eq!(view.to_vec(), [0, 1, 7, 8, 9, 5]);
            }

            #[test]
            fn write_clips_to_view() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                let sub = view.subarray(1, Some(3)).unwrap();
                sub.write(&[7u8, 8, 9, 10], 1).unwrap();
                assert_eq!(view.to_vec(), [0, 1, 7, 8, 4, 5]);
            }

            #[test]
            fn write_out_of_range_writes_nothing() {
                let view = $new(vec![0, 1, 2]);
                assert!(view.write(&[7u8], 3).is_err());
                assert_eq!(view.to_vec(), [0, 1, 2]);
            }

            #[test]
            fn write_view_of_any_variant() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                view.write_view(&super::tag_view(vec![7, 8]), 1).unwrap();
                assert_eq!(view.to_vec(), [0, 7, 8, 3, 4, 5]);

                view.write_view(&super::buffer_view(vec![9, 9, 9]), 4).unwrap();
                assert_eq!(view.to_vec(), [0, 7, 8, 3, 9, 9]);

                let sub = view.subarray(0, Some(2)).unwrap();
                view.write_view(&sub, 3).unwrap();
                assert_eq!(view.to_vec(), [0, 7, 8, 0, 7, 9]);
                assert!(view.write_view(&sub, 6).is_err());
            }

            #[test]
            fn direct_target_writes_are_visible() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                let sub = view.subarray(2, Some(3)).unwrap();
                sub.with_direct_target(|bytes| {
                    assert_eq!(&*bytes, &[2, 3, 4]);
                    bytes[0] = 7;
                });
                assert_eq!(sub.get_byte(0).unwrap(), 7);
                assert_eq!(view.get_bytes(2, Some(1)).unwrap().to_vec(), [7]);
            }

            #[test]
            fn copy_doesnt_alias() {
                let view = $new(vec![0, 1, 2, 3, 4, 5]);
                let mut copy = view.copy(1, Some(3)).unwrap();
                assert_eq!(copy, [1, 2, 3]);

                view.write(&[9u8], 1).unwrap();
                assert_eq!(copy, [1, 2, 3]);

                copy[0] = 42;
                assert_eq!(view.to_vec(), [0, 9, 2, 3, 4, 5]);
                assert!(view.copy(4, Some(3)).is_err());
            }

            #[test]
            fn derived_views_keep_buffer_alive() {
                let view = $new(vec![0, 1, 2, 3]);
                let sub = view.subarray(2, None).unwrap();
                assert_eq!(view.buffer().ref_count(), 2);
                drop(view);
                assert_eq!(sub.to_vec(), [2, 3]);
                assert_eq!(sub.buffer().ref_count(), 1);
            }
        };
    }

    mod buffer_view {
        view_tests!(super::buffer_view);
    }

    mod tag_view {
        view_tests!(super::tag_view);
    }

    #[test]
    fn new_from_byte_count() {
        let view = BufferView::new(3usize);
        assert_eq!(view.byte_length(), 3);
        assert_eq!(view.to_vec(), [0, 0, 0]);
    }

    #[test]
    fn new_from_vec() {
        let view = BufferView::new(vec![0, 0, 5]);
        assert_eq!(view.byte_length(), 3);
        assert_eq!(view.get_byte(2).unwrap(), 5);
    }

    #[test]
    fn with_window_over_buffer() {
        let buffer = Buffer::from(vec![10, 11, 12, 13, 14]);
        for offset in 0..=2 {
            let view = BufferView::with_window(buffer.clone(), offset, Some(3)).unwrap();
            assert_eq!(view.byte_length(), 3);
            for i in 0..3 {
                assert_eq!(view.get_byte(i).unwrap(), 10 + (offset + i) as u8);
            }
        }
    }

    #[test]
    fn with_window_out_of_range() {
        let result = BufferView::with_window(Buffer::new(5), 2, Some(10));
        assert_eq!(
            result.unwrap_err(),
            OutOfRange {
                required: Range::at(2, Some(10)),
                bounds: (0, 5),
            }
        );
    }

    #[test]
    fn with_window_from_view_composes() {
        let view = BufferView::with_window(vec![0, 1, 2, 3, 4, 5], 1, None).unwrap();
        let other = BufferView::with_window(&view, 2, Some(2)).unwrap();
        assert_eq!(other.byte_offset(), 3);
        assert_eq!(other.to_vec(), [3, 4]);
        assert!(other.buffer().ptr_eq(view.buffer()));
        assert!(BufferView::with_window(&view, 2, Some(4)).is_err());
    }

    #[test]
    fn caller_keeps_access_to_wrapped_buffer() {
        let buffer = Buffer::from(vec![0, 1, 2]);
        let view = BufferView::new(buffer.clone());
        buffer.write()[1] = 42;
        assert_eq!(view.get_byte(1).unwrap(), 42);
        view.write(&[43u8], 0).unwrap();
        assert_eq!(buffer.read()[0], 43);
    }

    #[test]
    fn new_from_slice_shares_memory() {
        let view = BufferView::new(vec![0, 1, 2, 3]);
        let other = BufferView::new(view.get_bytes(1, None).unwrap());
        other.write(&[9u8], 0).unwrap();
        assert_eq!(view.to_vec(), [0, 9, 2, 3]);
    }

    #[test]
    fn write_from_other_view() {
        let source = BufferView::new(vec![7, 8, 9]);
        let view = BufferView::new(vec![0, 1, 2, 3, 4, 5]);
        view.write(&source, 2).unwrap();
        assert_eq!(view.to_vec(), [0, 1, 7, 8, 9, 5]);
        view.write(&view.subarray(0, Some(2)).unwrap(), 1).unwrap();
        assert_eq!(view.to_vec(), [0, 0, 1, 8, 9, 5]);
    }

    #[test]
    fn subarray_preserves_variant() {
        let view = tag_view(vec![3, 1, 2, 3]);
        let payload: TagView = view.subarray(1, None).unwrap();
        assert_eq!(payload.tag().unwrap(), 1);
        let inner: TagView = payload.view(1..).unwrap();
        assert_eq!(inner.tag().unwrap(), 2);
    }

    #[test]
    fn subarray_dyn_preserves_variant() {
        let views: Vec<Box<dyn DynView>> = vec![
            Box::new(BufferView::new(vec![0, 1, 2, 3])),
            Box::new(tag_view(vec![0, 1, 2, 3])),
        ];

        let subs = views
            .iter()
            .map(|view| view.subarray_dyn(1, Some(2)).unwrap())
            .collect::<Vec<_>>();

        assert!(subs[0].as_any().downcast_ref::<BufferView>().is_some());
        let tag = subs[1].as_any().downcast_ref::<TagView>().unwrap();
        assert_eq!(tag.tag().unwrap(), 1);
        assert_eq!(subs[1].dyn_window().len(), 2);

        let cloned = subs[1].clone();
        assert!(cloned.as_any().downcast_ref::<TagView>().is_some());
        assert!(cloned.dyn_window().buffer().ptr_eq(views[1].dyn_window().buffer()));
    }
}
