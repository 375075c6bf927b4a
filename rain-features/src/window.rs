/// Fold a window that must be fully observed; any missing value yields `None`.
pub(crate) fn fold_complete(
    window: &[Option<f64>],
    init: f64,
    f: impl Fn(f64, f64) -> f64,
) -> Option<f64> {
    window.iter().try_fold(init, |acc, v| v.map(|v| f(acc, v)))
}

pub(crate) fn sum_complete(window: &[Option<f64>]) -> Option<f64> {
    fold_complete(window, 0.0, |acc, v| acc + v)
}

/// Callers never pass an empty window.
pub(crate) fn max_complete(window: &[Option<f64>]) -> Option<f64> {
    fold_complete(window, f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_windows() {
        assert_eq!(sum_complete(&[Some(1.0), Some(2.5)]), Some(3.5));
        assert_eq!(max_complete(&[Some(1.0), Some(2.5), Some(0.0)]), Some(2.5));
        assert_eq!(sum_complete(&[]), Some(0.0));
    }

    #[test]
    fn test_missing_value_poisons_window() {
        assert_eq!(sum_complete(&[Some(1.0), None]), None);
        assert_eq!(max_complete(&[None, Some(4.0)]), None);
    }
}
