//! Speed-based scoring.

use std::time::Duration;

/// Points for a correct guess with `remaining` left in the round.
///
/// `round(max_points × remaining / full_round)`, clamped to
/// `0..=max_points`. `full_round` is the *nominal* round length, so a
/// shortened final round can't pay out the full `max_points`.
pub fn points_for(remaining: Duration, full_round: Duration, max_points: u32) -> u32 {
    let full_ms = full_round.as_millis();
    if full_ms == 0 {
        return 0;
    }
    let remaining_ms = remaining.as_millis().min(full_ms);
    let scaled = u128::from(max_points) * remaining_ms;
    // Round half up in integer arithmetic.
    let points = (scaled * 2 + full_ms) / (full_ms * 2);
    points.min(u128::from(max_points)) as u32
}
