//! Forward-looking transforms over `t+1 ..= t+H`.
//!
//! These look ahead in the same historical series. They stand in for a
//! forecast during training and must not be fed to a live model as-is.
//! Every transform is missing for the final `H` rows and wherever the
//! lookahead window contains a missing value.

use crate::window::{max_complete, sum_complete};
use crate::Series;

/// The window `s[t+1 ..= t+h]`, or `None` when it runs past the end.
///
/// `t < s.len()`, so the bound is checked without forming `t + h`.
fn lookahead(s: &[Option<f64>], t: usize, h: usize) -> Option<&[Option<f64>]> {
    if h == 0 || h >= s.len() - t {
        None
    } else {
        Some(&s[t + 1..=t + h])
    }
}

fn forward(s: &[Option<f64>], h: usize, f: impl Fn(&[Option<f64>]) -> Option<f64>) -> Series {
    (0..s.len())
        .map(|t| lookahead(s, t, h).and_then(&f))
        .collect()
}

/// Sum over the next `h` hours.
pub fn future_sum(s: &[Option<f64>], h: usize) -> Series {
    forward(s, h, sum_complete)
}

/// Max over the next `h` hours.
pub fn future_max(s: &[Option<f64>], h: usize) -> Series {
    forward(s, h, max_complete)
}

/// Offset in `1..=h` of the largest value in the next `h` hours.
///
/// Ties resolve to the earliest offset.
pub fn time_to_peak(s: &[Option<f64>], h: usize) -> Series {
    forward(s, h, |window| {
        let mut peak: Option<(usize, f64)> = None;
        for (i, value) in window.iter().enumerate() {
            let value = (*value)?;
            match peak {
                Some((_, best)) if value <= best => {}
                _ => peak = Some((i, value)),
            }
        }
        peak.map(|(i, _)| (i + 1) as f64)
    })
}

/// `FutureSum(h/2) / FutureSum(h)` with `h/2` floored.
///
/// Missing when the full-horizon sum is exactly zero.
pub fn front_share(s: &[Option<f64>], h: usize) -> Series {
    let half = h / 2;
    forward(s, h, |window| {
        let total = sum_complete(window)?;
        if total == 0.0 {
            return None;
        }
        let front = sum_complete(&window[..half])?;
        Some(front / total)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Series {
        values.iter().map(|v| Some(*v)).collect()
    }

    // value at t=0 is ignored by every forward transform at t=0
    const AHEAD: [f64; 5] = [9.0, 3.0, 1.0, 2.0, 4.0];

    #[test]
    fn test_scenario_at_t0() {
        let s = series(&AHEAD);
        assert_eq!(future_sum(&s, 4)[0], Some(10.0));
        assert_eq!(future_max(&s, 4)[0], Some(4.0));
        assert_eq!(time_to_peak(&s, 4)[0], Some(4.0));
        assert_eq!(front_share(&s, 4)[0], Some(0.4));
    }

    #[test]
    fn test_final_rows_missing() {
        let s = series(&AHEAD);
        let sums = future_sum(&s, 2);
        assert_eq!(sums, vec![Some(4.0), Some(3.0), Some(6.0), None, None]);
        assert!(future_max(&s, 5).iter().all(Option::is_none));
        let ttp = time_to_peak(&s, 4);
        assert_eq!(ttp[1..], [None, None, None, None]);
    }

    #[test]
    fn test_future_sum_one_hour_is_next_value() {
        let s = series(&AHEAD);
        assert_eq!(
            future_sum(&s, 1),
            vec![Some(3.0), Some(1.0), Some(2.0), Some(4.0), None]
        );
    }

    #[test]
    fn test_time_to_peak_earliest_tie() {
        let s = series(&[0.0, 2.0, 5.0, 5.0, 1.0]);
        let ttp = time_to_peak(&s, 4);
        assert_eq!(ttp[0], Some(2.0));
        let flat = series(&[0.0; 7]);
        assert_eq!(time_to_peak(&flat, 3)[0], Some(1.0));
    }

    #[test]
    fn test_time_to_peak_range() {
        let raw = [0.0, 1.2, 0.4, 3.3, 3.3, 0.0, 2.1, 7.5, 0.2, 0.0, 1.0, 0.6];
        let s = series(&raw);
        for h in 1..=6 {
            for (t, v) in time_to_peak(&s, h).into_iter().enumerate() {
                let Some(offset) = v else { continue };
                let offset = offset as usize;
                assert!((1..=h).contains(&offset));
                let window = &raw[t + 1..=t + h];
                let max = window.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let first = window.iter().position(|x| *x == max).unwrap() + 1;
                assert_eq!(offset, first, "h={h} t={t}");
            }
        }
    }

    #[test]
    fn test_front_share_zero_total_is_missing() {
        let s = series(&[1.0, 0.0, 0.0, 0.0, 0.0, 2.0]);
        let share = front_share(&s, 4);
        assert_eq!(share[0], None);
        assert_eq!(share[1], Some(0.0));
    }

    #[test]
    fn test_front_share_in_unit_interval() {
        let raw = [0.0, 1.2, 0.4, 3.3, 0.0, 0.0, 2.1, 7.5, 0.2, 0.0, 1.0, 0.6];
        let s = series(&raw);
        let sums = future_sum(&s, 4);
        for (t, share) in front_share(&s, 4).into_iter().enumerate() {
            match (share, sums[t]) {
                (Some(share), Some(total)) => {
                    assert!(total > 0.0);
                    assert!((0.0..=1.0).contains(&share));
                }
                (None, Some(total)) => assert_eq!(total, 0.0),
                (None, None) => {}
                (Some(_), None) => panic!("share defined without a total at t={t}"),
            }
        }
    }

    #[test]
    fn test_front_share_odd_horizon_floors_half() {
        let s = series(&[0.0, 1.0, 1.0, 1.0]);
        // horizon 3: first half is one hour
        let share = front_share(&s, 3);
        assert!((share[0].unwrap() - 1.0 / 3.0).abs() < 1e-12);
        // horizon 1: the first half is empty
        assert_eq!(front_share(&s, 1)[0], Some(0.0));
    }

    #[test]
    fn test_huge_horizon_is_missing() {
        let s = series(&AHEAD);
        assert!(future_sum(&s, usize::MAX).iter().all(Option::is_none));
        assert!(future_max(&s, usize::MAX).iter().all(Option::is_none));
        assert!(time_to_peak(&s, usize::MAX).iter().all(Option::is_none));
        assert!(front_share(&s, usize::MAX).iter().all(Option::is_none));
    }

    #[test]
    fn test_missing_in_lookahead() {
        let s = vec![Some(0.0), Some(1.0), None, Some(2.0), Some(0.0)];
        assert_eq!(future_sum(&s, 2), vec![None, None, Some(2.0), None, None]);
        assert_eq!(time_to_peak(&s, 2)[2], Some(1.0));
        assert_eq!(front_share(&s, 2)[0], None);
    }
}
