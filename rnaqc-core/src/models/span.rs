///
/// Anything with a half-open genomic extent.
///
pub trait Span {
    fn start(&self) -> u32;
    fn end(&self) -> u32;

    fn width(&self) -> u32 {
        self.end().saturating_sub(self.start())
    }
}

impl Span for (u32, u32) {
    fn start(&self) -> u32 {
        self.0
    }

    fn end(&self) -> u32 {
        self.1
    }
}

///
/// Length of the overlap between two half-open ranges. Disjoint or
/// abutting ranges give zero.
///
#[inline]
pub fn overlap_length<A: Span + ?Sized, B: Span + ?Sized>(a: &A, b: &B) -> u32 {
    std::cmp::min(a.end(), b.end()).saturating_sub(std::cmp::max(a.start(), b.start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case((10, 20), (15, 30), 5)]
    #[case((10, 20), (20, 30), 0)]
    #[case((10, 20), (0, 100), 10)]
    #[case((10, 20), (30, 40), 0)]
    #[case((1010, 1990), (1015, 1040), 25)]
    fn test_overlap_length(#[case] a: (u32, u32), #[case] b: (u32, u32), #[case] expected: u32) {
        assert_eq!(overlap_length(&a, &b), expected);
        assert_eq!(overlap_length(&b, &a), expected);
    }

    #[rstest]
    fn test_inverted_span_has_no_width() {
        assert_eq!((30u32, 10u32).width(), 0);
        assert_eq!(overlap_length(&(30u32, 10u32), &(0u32, 100u32)), 0);
    }
}
