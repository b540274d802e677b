//! Dense profiles from sparse breakpoints.
//!
//! A breakpoint map assigns values to a few tick indices; the dense profile
//! carries one value per tick, ramping linearly between consecutive
//! breakpoints and holding the last value to the end of the horizon.

use std::collections::BTreeMap;

/// Expands `breakpoints` into a profile of exactly `length` samples.
///
/// - A missing index `0` is treated as `(0, 0.0)`.
/// - Between consecutive keys `k0 < k1` the samples `[k0, min(k1, length))`
///   are evenly spaced from `val0` to `val1`, both endpoints included.
/// - Samples from the last key to the end hold the last value.
///
/// Keys at or beyond `length` are tolerated; a segment that starts past the
/// end of the horizon contributes nothing.
pub fn build_dense_profile(breakpoints: &BTreeMap<usize, f64>, length: usize) -> Vec<f64> {
    let mut profile = vec![0.0; length];

    let mut points: Vec<(usize, f64)> = breakpoints.iter().map(|(&k, &v)| (k, v)).collect();
    if !breakpoints.contains_key(&0) {
        points.insert(0, (0, 0.0));
    }

    for pair in points.windows(2) {
        let (k0, val0) = pair[0];
        let (k1, val1) = pair[1];
        let end = k1.min(length);
        if k0 >= end {
            continue;
        }
        fill_linspace(&mut profile[k0..end], val0, val1);
    }

    if let Some(&(last_key, last_value)) = points.last() {
        if last_key < length {
            profile[last_key..].fill(last_value);
        }
    }

    profile
}

/// Writes `out.len()` evenly spaced samples from `start` to `stop` inclusive.
fn fill_linspace(out: &mut [f64], start: f64, stop: f64) {
    let n = out.len();
    match n {
        0 => {}
        1 => out[0] = start,
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            for (j, slot) in out.iter_mut().enumerate() {
                *slot = start + step * j as f64;
            }
            out[n - 1] = stop;
        }
    }
}
