use serde::{Deserialize, Serialize};
use std::fmt;

/// One configured feature instance of a channel.
///
/// Past-only families read `t` and earlier; forward-looking families read
/// `t+1 ..= t+H` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// Value `h` hours before `t`.
    Lag(usize),
    /// Sum over the trailing window `[t-w+1, t]`.
    RollingSum(usize),
    /// Max over the trailing window `[t-w+1, t]`.
    RollingMax(usize),
    /// Antecedent precipitation index with the given half-life in hours.
    Api(u32),
    /// Consecutive dry hours strictly before `t`.
    DrySpell,
    /// 1.0 when the current hour is wet.
    RainNow,
    /// `s[t] - s[t-1]`.
    Delta1h,
    FutureSum(usize),
    FutureMax(usize),
    /// 1-indexed offset of the first maximum in the next `H` hours.
    TimeToPeak(usize),
    /// Share of the next `H` hours' rain falling in the first `H/2` hours.
    FrontShare(usize),
}

impl Feature {
    /// Family-qualified name without the channel suffix, e.g. `sum12h`.
    pub fn name(&self) -> String {
        match self {
            Feature::Lag(h) => format!("lag{h}h"),
            Feature::RollingSum(w) => format!("sum{w}h"),
            Feature::RollingMax(w) => format!("max{w}h"),
            Feature::Api(hl) => format!("api_hl{hl}h"),
            Feature::DrySpell => "dryspell".to_string(),
            Feature::RainNow => "rainnow".to_string(),
            Feature::Delta1h => "delta1h".to_string(),
            Feature::FutureSum(h) => format!("next{h}h_sum"),
            Feature::FutureMax(h) => format!("next{h}h_max"),
            Feature::TimeToPeak(h) => format!("ttp_next{h}h"),
            Feature::FrontShare(h) => format!("frontshare_next{h}h"),
        }
    }

    pub fn is_forward_looking(&self) -> bool {
        matches!(
            self,
            Feature::FutureSum(_)
                | Feature::FutureMax(_)
                | Feature::TimeToPeak(_)
                | Feature::FrontShare(_)
        )
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
