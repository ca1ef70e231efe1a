//! Small stateless helpers shared by tests, benches and callers.

use core::cmp::Ordering;
use rand::distr::uniform::SampleUniform;
use rand::Rng;

/// Exchanges two values in place.
#[inline]
pub fn swap<T>(a: &mut T, b: &mut T) {
    core::mem::swap(a, b)
}

/// Compares two sequences element by element over their common prefix.
///
/// Returns the ordering of the first differing pair, or `Equal` when one
/// sequence is a prefix of the other. Length is deliberately not part of
/// the result; callers that need it compare lengths themselves.
pub fn compare<L, R, T>(left: L, right: R) -> Ordering
where
    L: IntoIterator<Item = T>,
    R: IntoIterator<Item = T>,
    T: Ord,
{
    left.into_iter()
        .zip(right)
        .map(|(l, r)| l.cmp(&r))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Position of the first item equal to `value`.
pub fn find_first<I, T>(items: I, value: &T) -> Option<usize>
where
    I: IntoIterator,
    I::Item: PartialEq<T>,
{
    items.into_iter().position(|item| item == *value)
}

/// Uniformly random value in the inclusive range spanned by `a` and `b`,
/// in either order.
pub fn random_between<T>(mut a: T, mut b: T) -> T
where
    T: SampleUniform + PartialOrd,
{
    if a > b {
        swap(&mut a, &mut b);
    }
    rand::rng().random_range(a..=b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_exchanges() {
        let mut a = String::from("left");
        let mut b = String::from("right");
        swap(&mut a, &mut b);
        assert_eq!((a.as_str(), b.as_str()), ("right", "left"));
    }

    #[test]
    fn compare_uses_first_difference_only() {
        assert_eq!(compare([1, 2, 3], [1, 2, 4]), Ordering::Less);
        assert_eq!(compare([2, 0], [1, 9, 9]), Ordering::Greater);
        assert_eq!(compare([1, 2], [1, 2, 3]), Ordering::Equal);
        assert_eq!(compare(Vec::<u8>::new(), vec![1]), Ordering::Equal);
    }

    #[test]
    fn find_first_returns_earliest_match() {
        assert_eq!(find_first([5, 3, 5], &5), Some(0));
        assert_eq!(find_first(vec!["a", "b"], &"b"), Some(1));
        assert_eq!(find_first([1, 2], &9), None);
    }

    #[test]
    fn random_between_stays_in_bounds() {
        for _ in 0..200 {
            let x = random_between(3u32, 7u32);
            assert!((3..=7).contains(&x));
            let y = random_between(10i64, -10i64);
            assert!((-10..=10).contains(&y));
        }
        assert_eq!(random_between(4u8, 4u8), 4);
    }
}
