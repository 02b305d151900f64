//! Linear scales with "nice" bounds and tick generation
//!
//! Follows the usual 1-2-5 tick ladder: a step is picked from
//! `{1, 2, 5, 10} * 10^n` so that roughly `count` ticks fit the domain, and
//! nicing widens the domain outward to multiples of that step. Nicing never
//! shrinks a domain, so data at the extremes is never clipped.

use serde::Serialize;

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)

/// Default tick count used when nicing a domain
pub const NICE_TICKS: usize = 10;

/// Maps `domain` linearly onto `range`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    /// Domain value → pixel
    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Pixel → domain value
    pub fn invert(&self, pixel: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }

    pub fn with_range(&self, range: [f64; 2]) -> Self {
        Self { domain: self.domain, range }
    }

    /// Widen the domain outward to round tick multiples
    pub fn nice(mut self, count: usize) -> Self {
        let [mut start, mut stop] = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }

        let mut previous: Option<f64> = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count as f64);
            if previous == Some(step) {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            previous = Some(step);
        }

        self.domain = if reversed { [stop, start] } else { [start, stop] };
        self
    }

    /// Round tick values inside the domain
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain[0], self.domain[1], count as f64)
    }
}

/// Smallest and largest finite value, `None` if there is none
pub fn extent<I: IntoIterator<Item = f64>>(values: I) -> Option<[f64; 2]> {
    values.into_iter().filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some([v, v]),
        Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
    })
}

/// Extent usable as a scale domain: `[0, 1]` when empty, widened when flat
pub fn drawable_extent(extent: Option<[f64; 2]>) -> [f64; 2] {
    match extent {
        None => [0.0, 1.0],
        Some([lo, hi]) if lo == hi => [lo - 1.0, hi + 1.0],
        Some(e) => e,
    }
}

/// Positive: step size. Negative: `-1/step` for sub-unit steps, which keeps
/// the arithmetic exact for decimals like 0.1.
pub fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    let step = (stop - start) / count.max(0.0);
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

/// Absolute distance between two adjacent ticks
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let (lo, hi) = if stop < start { (stop, start) } else { (start, stop) };
    let inc = tick_increment(lo, hi, count as f64);
    if inc < 0.0 {
        -1.0 / inc
    } else {
        inc
    }
}

fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let inc = tick_increment(start, stop, count);
    if inc == 0.0 {
        return None;
    }

    let (mut i1, mut i2);
    if inc < 0.0 {
        let m = -inc;
        i1 = (start * m).round() as i64;
        i2 = (stop * m).round() as i64;
        if (i1 as f64) / m < start {
            i1 += 1;
        }
        if (i2 as f64) / m > stop {
            i2 -= 1;
        }
    } else {
        i1 = (start / inc).round() as i64;
        i2 = (stop / inc).round() as i64;
        if (i1 as f64) * inc < start {
            i1 += 1;
        }
        if (i2 as f64) * inc > stop {
            i2 -= 1;
        }
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some((i1, i2, inc))
}

/// Round values in `[start, stop]`, at most roughly `count` of them
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reversed = stop < start;
    let (lo, hi) = if reversed { (stop, start) } else { (start, stop) };

    let Some((i1, i2, inc)) = tick_spec(lo, hi, count) else {
        return Vec::new();
    };
    if i2 < i1 {
        return Vec::new();
    }

    let mut out: Vec<f64> = (i1..=i2)
        .map(|i| if inc < 0.0 { i as f64 / -inc } else { i as f64 * inc })
        .collect();
    if reversed {
        out.reverse();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // MAPPING
    // ==========================================================================

    #[test]
    fn test_apply_and_invert() {
        let scale = LinearScale::new([0.0, 100.0], [40.0, 620.0]);
        assert_eq!(scale.apply(0.0), 40.0);
        assert_eq!(scale.apply(100.0), 620.0);
        assert_eq!(scale.apply(50.0), 330.0);
        assert_eq!(scale.invert(330.0), 50.0);
    }

    #[test]
    fn test_inverted_range() {
        // value axes grow upwards
        let scale = LinearScale::new([-10.0, 10.0], [370.0, 20.0]);
        assert_eq!(scale.apply(-10.0), 370.0);
        assert_eq!(scale.apply(10.0), 20.0);
        assert_eq!(scale.invert(195.0), 0.0);
    }

    #[test]
    fn test_flat_domain_maps_to_middle() {
        let scale = LinearScale::new([5.0, 5.0], [0.0, 100.0]);
        assert_eq!(scale.apply(5.0), 50.0);
        assert_eq!(scale.invert(20.0), 5.0);
    }

    // ==========================================================================
    // NICE
    // ==========================================================================

    #[test]
    fn test_nice_never_clips() {
        let scale = LinearScale::new([12.3, 987.6], [0.0, 1.0]).nice(NICE_TICKS);
        assert!(scale.domain[0] <= 12.3);
        assert!(scale.domain[1] >= 987.6);
        assert_eq!(scale.domain, [0.0, 1000.0]);
    }

    #[test]
    fn test_nice_small_decimals() {
        let scale = LinearScale::new([0.123, 0.987], [0.0, 1.0]).nice(NICE_TICKS);
        assert_eq!(scale.domain, [0.1, 1.0]);
    }

    #[test]
    fn test_nice_negative_span() {
        let scale = LinearScale::new([-1013.0, 1042.0], [0.0, 1.0]).nice(NICE_TICKS);
        assert!(scale.domain[0] <= -1013.0);
        assert!(scale.domain[1] >= 1042.0);
        assert_eq!(scale.domain, [-1200.0, 1200.0]);
    }

    #[test]
    fn test_nice_keeps_round_domain() {
        let scale = LinearScale::new([0.0, 100.0], [0.0, 1.0]).nice(NICE_TICKS);
        assert_eq!(scale.domain, [0.0, 100.0]);
    }

    #[test]
    fn test_nice_flat_domain_untouched() {
        let scale = LinearScale::new([3.0, 3.0], [0.0, 1.0]).nice(NICE_TICKS);
        assert_eq!(scale.domain, [3.0, 3.0]);
    }

    // ==========================================================================
    // TICKS
    // ==========================================================================

    #[test]
    fn test_ticks_unit_steps() {
        assert_eq!(ticks(0.0, 10.0, 10.0), (0..=10).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_ticks_decimal_steps_are_exact() {
        assert_eq!(ticks(0.0, 1.0, 5.0), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
    }

    #[test]
    fn test_ticks_inside_domain() {
        let t = ticks(12.3, 987.6, 8.0);
        assert_eq!(t.first(), Some(&100.0));
        assert_eq!(t.last(), Some(&900.0));
        assert!(t.iter().all(|v| (12.3..=987.6).contains(v)));
    }

    #[test]
    fn test_ticks_reversed() {
        assert_eq!(ticks(10.0, 0.0, 2.0), vec![10.0, 5.0, 0.0]);
    }

    #[test]
    fn test_ticks_degenerate() {
        assert_eq!(ticks(3.0, 3.0, 5.0), vec![3.0]);
        assert!(ticks(0.0, 1.0, 0.0).is_empty());
        assert!(ticks(f64::NAN, 1.0, 5.0).is_empty());
    }

    #[test]
    fn test_tick_step() {
        assert_eq!(tick_step(0.0, 1000.0, 10), 100.0);
        assert_eq!(tick_step(0.0, 1.0, 10), 0.1);
        assert_eq!(tick_step(1000.0, 0.0, 5), 200.0);
    }

    #[test]
    fn test_ticks_follow_tick_increment() {
        for &(lo, hi, count) in &[(0.0, 1.0, 10.0), (12.3, 987.6, 8.0), (-0.05, 0.07, 6.0), (0.0, 2.5e4, 5.0)] {
            let t = ticks(lo, hi, count);
            let step = tick_step(lo, hi, count as usize);
            assert!(t.len() >= 2, "{:?}", (lo, hi));
            for pair in t.windows(2) {
                assert!(((pair[1] - pair[0]) - step).abs() < step * 1e-9, "{:?}", (lo, hi));
            }
        }
        // a sub-unit step comes back negated and inverted
        assert_eq!(tick_increment(0.0, 1.0, 10.0), -10.0);
        assert_eq!(tick_spec(0.0, 1.0, 10.0), Some((0, 10, -10.0)));
        assert_eq!(tick_spec(0.0, 1000.0, 10.0), Some((0, 10, 100.0)));
    }

    // ==========================================================================
    // EXTENT
    // ==========================================================================

    #[test]
    fn test_extent_skips_non_finite() {
        assert_eq!(extent(vec![3.0, f64::NAN, -2.0, f64::INFINITY, 7.0]), Some([-2.0, 7.0]));
        assert_eq!(extent(Vec::<f64>::new()), None);
        assert_eq!(extent(vec![f64::NAN]), None);
    }

    #[test]
    fn test_drawable_extent() {
        assert_eq!(drawable_extent(None), [0.0, 1.0]);
        assert_eq!(drawable_extent(Some([4.0, 4.0])), [3.0, 5.0]);
        assert_eq!(drawable_extent(Some([1.0, 2.0])), [1.0, 2.0]);
    }
}
