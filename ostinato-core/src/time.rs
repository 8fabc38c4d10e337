//! Millisecond timestamp helpers
//!
//! Timestamps are `u32` milliseconds since boot. They wrap after ~49 days,
//! so every comparison goes through wrapping arithmetic.

/// Check whether `deadline` has been reached at `now`
///
/// Valid as long as the two instants are less than ~24 days apart.
#[inline]
pub fn reached(now_ms: u32, deadline_ms: u32) -> bool {
    now_ms.wrapping_sub(deadline_ms) as i32 >= 0
}

/// Milliseconds elapsed from `since` to `now`
#[inline]
pub fn elapsed(now_ms: u32, since_ms: u32) -> u32 {
    now_ms.wrapping_sub(since_ms)
}

/// Milliseconds remaining until `deadline`, zero if already reached
#[inline]
pub fn remaining(now_ms: u32, deadline_ms: u32) -> u32 {
    if reached(now_ms, deadline_ms) {
        0
    } else {
        deadline_ms.wrapping_sub(now_ms)
    }
}

/// The earlier of two deadlines
pub fn earliest(a: Option<u32>, b: Option<u32>, now_ms: u32) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => {
            if remaining(now_ms, a) <= remaining(now_ms, b) {
                Some(a)
            } else {
                Some(b)
            }
        }
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}
