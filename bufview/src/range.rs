use std::{
    fmt::Debug,
    ops::{
        Bound,
        RangeBounds,
    },
};

/// A range of bytes relative to the start of a view.
///
/// Open ends are `None`: a missing start means `0`, a missing end means "until
/// the end of the view".
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl Range {
    #[inline]
    fn from_range_bounds(range: impl RangeBounds<usize>) -> Self {
        let start = match range.start_bound() {
            Bound::Included(start) => Some(*start),
            Bound::Excluded(start) => Some(start.saturating_add(1)),
            Bound::Unbounded => None,
        };
        let end = match range.end_bound() {
            Bound::Included(end) => Some(end.saturating_add(1)),
            Bound::Excluded(end) => Some(*end),
            Bound::Unbounded => None,
        };

        Self { start, end }
    }

    /// Creates the range `offset..offset + length`, or `offset..` if no length
    /// is given.
    #[inline]
    pub fn at(offset: usize, length: Option<usize>) -> Self {
        Self {
            start: Some(offset),
            end: length.map(|length| offset.saturating_add(length)),
        }
    }
}

macro_rules! impl_from_range_bounds {
    {
        $(
            $ty:ty;
        )*
    } => {
        $(
            impl From<$ty> for Range {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::from_range_bounds(value)
                }
            }
        )*
    };
}

impl_from_range_bounds! {
    std::ops::Range<usize>;
    std::ops::RangeFrom<usize>;
    std::ops::RangeFull;
    std::ops::RangeInclusive<usize>;
    std::ops::RangeTo<usize>;
    std::ops::RangeToInclusive<usize>;
}

impl From<usize> for Range {
    #[inline]
    fn from(value: usize) -> Self {
        Self {
            start: Some(value),
            end: Some(value.saturating_add(1)),
        }
    }
}

impl<'a> From<&'a Range> for Range {
    #[inline]
    fn from(value: &'a Range) -> Self {
        *value
    }
}

impl From<(usize, usize)> for Range {
    #[inline]
    fn from((start, end): (usize, usize)) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

impl Range {
    /// Resolves this relative range against the absolute window
    /// `start..end`.
    ///
    /// Returns the absolute `(start, end)` indices, or [`OutOfRange`] if the
    /// resolved range isn't fully contained in `start..end`, or if it ends
    /// before it starts.
    pub fn indices_checked_in(
        &self,
        start: usize,
        end: usize,
    ) -> Result<(usize, usize), OutOfRange> {
        let err = || {
            Err(OutOfRange {
                required: *self,
                bounds: (start, end),
            })
        };

        let index_start = if let Some(range_start) = self.start {
            match range_start.checked_add(start) {
                Some(index_start) if index_start <= end => index_start,
                _ => return err(),
            }
        }
        else {
            start
        };

        let index_end = if let Some(range_end) = self.end {
            match range_end.checked_add(start) {
                Some(index_end) if index_end <= end && index_end >= index_start => index_end,
                _ => return err(),
            }
        }
        else {
            end
        };

        Ok((index_start, index_end))
    }
}

impl Debug for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        write!(f, "..")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

/// A window, index or offset doesn't fit into the view it was applied to.
///
/// `bounds` are the absolute bounds of the view within its backing buffer.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Range out of bounds: {required:?} not in view ({}..{})", .bounds.0, .bounds.1)]
pub struct OutOfRange {
    pub required: Range,
    pub bounds: (usize, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_range() {
        let r = Range::from(..);

        assert_eq!(r.start, None);
        assert_eq!(r.end, None);
        assert_eq!(r.indices_checked_in(12, 34).unwrap(), (12, 34));
    }

    #[test]
    fn range_with_upper_bound() {
        let r = Range::from(..4);

        assert_eq!(r.start, None);
        assert_eq!(r.end, Some(4));
        assert_eq!(r.indices_checked_in(12, 34).unwrap(), (12, 16));
    }

    #[test]
    fn offset_and_length() {
        assert_eq!(Range::at(1, Some(4)), Range::from(1..5));
        assert_eq!(Range::at(3, None), Range::from(3..));
        assert_eq!(
            Range::at(1, Some(4)).indices_checked_in(10, 16).unwrap(),
            (11, 15)
        );
    }

    #[test]
    fn range_past_the_end_is_rejected() {
        let r = Range::from(2..12);
        assert_eq!(
            r.indices_checked_in(0, 5).unwrap_err(),
            OutOfRange {
                required: r,
                bounds: (0, 5),
            }
        );
    }

    #[test]
    fn start_past_the_end_is_rejected() {
        assert!(Range::from(6..).indices_checked_in(0, 5).is_err());
        assert_eq!(Range::from(5..).indices_checked_in(0, 5).unwrap(), (5, 5));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(Range::from((4, 2)).indices_checked_in(0, 5).is_err());
    }

    #[test]
    fn overflowing_range_is_rejected() {
        assert!(Range::at(usize::MAX, Some(2))
            .indices_checked_in(1, 5)
            .is_err());
        assert!(Range::from(usize::MAX).indices_checked_in(0, 5).is_err());
    }
}
