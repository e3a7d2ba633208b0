/// Closed range of unsigned integer values, `low..=high`.
///
/// Used as the running min/max accumulator of every per-voxel field.
/// [`ValueRange::merge`] is associative and commutative, so partial ranges
/// computed by parallel workers reduce to the same result in any order.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ValueRange {
    /// Lower bound
    pub low: u32,
    /// Upper bound
    pub high: u32,
}

impl ValueRange {
    /// Constructs new, empty range.
    pub fn empty() -> ValueRange {
        ValueRange {
            low: u32::MAX,
            high: 0,
        }
    }

    /// Constructs new range with one element, `val`.
    pub fn seed(val: u32) -> ValueRange {
        ValueRange {
            low: val,
            high: val,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    /// Extend the range with new value.
    pub fn extend(&mut self, val: u32) {
        self.low = self.low.min(val);
        self.high = self.high.max(val);
    }

    /// Smallest range containing both `self` and `other`.
    pub fn merge(self, other: ValueRange) -> ValueRange {
        ValueRange {
            low: self.low.min(other.low),
            high: self.high.max(other.high),
        }
    }

    /// Bounds as floats, `(0.0, 0.0)` for an empty range.
    pub fn as_f32(&self) -> (f32, f32) {
        if self.is_empty() {
            (0.0, 0.0)
        } else {
            (self.low as f32, self.high as f32)
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn range_of(values: &[u32]) -> ValueRange {
        let mut range = ValueRange::empty();
        for &val in values {
            range.extend(val);
        }
        range
    }

    #[test]
    fn value_range() {
        let mut range = ValueRange::seed(1);
        assert_eq!(range, ValueRange { low: 1, high: 1 });

        for val in [0, 5, 3, 12] {
            range.extend(val);
        }

        assert_eq!(range.low, 0);
        assert_eq!(range.high, 12);
        assert_eq!(range.as_f32(), (0.0, 12.0));
    }

    #[test]
    fn empty_value_range() {
        let mut range = ValueRange::empty();

        assert!(range.is_empty());
        assert_eq!(range.as_f32(), (0.0, 0.0));

        range.extend(2);

        assert!(!range.is_empty());
        assert_eq!(range.low, 2);
        assert_eq!(range.high, 2);
    }

    #[test]
    fn merge_ignores_order() {
        let a = range_of(&[4, 9]);
        let b = range_of(&[1, 6]);
        let c = ValueRange::seed(30);
        let empty = ValueRange::empty();

        assert_eq!(a.merge(b), b.merge(a));
        assert_eq!(a.merge(b).merge(c), a.merge(b.merge(c)));
        assert_eq!(a.merge(empty), a);
        assert_eq!(a.merge(b).merge(c), ValueRange { low: 1, high: 30 });
    }
}
