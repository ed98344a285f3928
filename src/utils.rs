/// General functions used across the project

use std::sync::atomic::{AtomicU64, Ordering};

/// Raise `dst` to `val` if `val` is larger. Returns true if `val` was stored.
#[inline]
pub fn atomic_max_u64(dst: &AtomicU64, val: u64) -> bool {
    let mut cur = dst.load(Ordering::Relaxed);
    while val > cur {
        match dst.compare_exchange_weak(cur, val, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return true,
            Err(next) => cur = next,
        }
    }
    false
}

/// Percent difference of two lengths, relative to their mean.
pub fn percent_difference(a: u32, b: u32) -> f64 {
    if a == 0 && b == 0 {
        return 0.0;
    }
    200.0 * (a as f64 - b as f64).abs() / (a as f64 + b as f64)
}
