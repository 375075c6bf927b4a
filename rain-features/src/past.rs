//! Past-only transforms: each output at `t` reads `s[..=t]` and nothing later.
//!
//! Missing inputs propagate through lags, deltas and windows. The API
//! treats a missing hour as no rain, and the dry-spell count treats it as dry.

use crate::window::{max_complete, sum_complete};
use crate::Series;

/// `s[t-h]`, missing for the first `h` positions.
pub fn lag(s: &[Option<f64>], h: usize) -> Series {
    (0..s.len())
        .map(|t| if t >= h { s[t - h] } else { None })
        .collect()
}

fn trailing(s: &[Option<f64>], w: usize, f: fn(&[Option<f64>]) -> Option<f64>) -> Series {
    (0..s.len())
        .map(|t| {
            if w == 0 || t + 1 < w {
                None
            } else {
                f(&s[t + 1 - w..=t])
            }
        })
        .collect()
}

/// Sum over `[t-w+1, t]`; missing while fewer than `w` rows exist. Never a partial sum.
pub fn rolling_sum(s: &[Option<f64>], w: usize) -> Series {
    trailing(s, w, sum_complete)
}

/// Max over `[t-w+1, t]`, with the same availability rule as [`rolling_sum`].
pub fn rolling_max(s: &[Option<f64>], w: usize) -> Series {
    trailing(s, w, max_complete)
}

/// Per-hour decay factor `k = 0.5^(1/hl)`.
pub fn api_decay(halflife_hours: u32) -> f64 {
    0.5f64.powf(1.0 / halflife_hours as f64)
}

/// Antecedent precipitation index: `API_t = k * API_{t-1} + R_t`, with `API_{-1} = 0`.
///
/// A strict fold over the time axis carrying one scalar; always defined.
pub fn api(s: &[Option<f64>], halflife_hours: u32) -> Series {
    let k = api_decay(halflife_hours);
    s.iter()
        .scan(0.0f64, |state, value| {
            *state = k * *state + value.unwrap_or(0.0);
            Some(Some(*state))
        })
        .collect()
}

/// Consecutive hours strictly before `t` with rainfall `<= threshold`.
///
/// Zero at the first row (no prior hours) and at the hour after any wet hour.
pub fn dry_spell(s: &[Option<f64>], threshold: f64) -> Series {
    let mut out = Vec::with_capacity(s.len());
    let mut run = 0u32;
    for t in 0..s.len() {
        if t > 0 {
            if s[t - 1].unwrap_or(0.0) <= threshold {
                run += 1;
            } else {
                run = 0;
            }
        }
        out.push(Some(run as f64));
    }
    out
}

/// 1.0 when `s[t] > threshold`, else 0.0. A missing hour is not raining.
pub fn rain_now(s: &[Option<f64>], threshold: f64) -> Series {
    s.iter()
        .map(|v| match v {
            Some(v) if *v > threshold => Some(1.0),
            _ => Some(0.0),
        })
        .collect()
}

/// `s[t] - s[t-1]`, missing at the first row.
pub fn delta_1h(s: &[Option<f64>]) -> Series {
    (0..s.len())
        .map(|t| match (t.checked_sub(1).and_then(|p| s[p]), s[t]) {
            (Some(prev), Some(now)) => Some(now - prev),
            _ => None,
        })
        .collect()
}
