//! Cricket over notation. `19.2` means 19 complete overs plus 2 legal balls,
//! so the digit after the point only ever runs from 0 to 5.

pub const BALLS_PER_OVER: u32 = 6;

const EPSILON: f64 = 1e-6;

/// Upper bound (exclusive) on the whole-over part so the ball count fits in a `u32`.
const MAX_OVERS: f64 = (u32::MAX / BALLS_PER_OVER) as f64;

/// Number of legal balls represented by `overs`, or `None` when the value is
/// negative, not finite, too large to count in balls, has more than one
/// decimal, or a ball digit above 5.
pub fn to_balls(overs: f64) -> Option<u32> {
    if !overs.is_finite() || overs < 0.0 || overs >= MAX_OVERS {
        return None;
    }
    let whole = overs.trunc();
    let tenths = (overs - whole) * 10.0;
    let ball = tenths.round();
    if (tenths - ball).abs() > EPSILON || ball >= BALLS_PER_OVER as f64 {
        return None;
    }
    u32::try_from(whole as u64)
        .ok()?
        .checked_mul(BALLS_PER_OVER)?
        .checked_add(ball as u32)
}

pub fn from_balls(balls: u32) -> f64 {
    f64::from(balls / BALLS_PER_OVER) + f64::from(balls % BALLS_PER_OVER) / 10.0
}

pub fn is_valid(overs: f64) -> bool {
    to_balls(overs).is_some()
}

/// Move `overs` forward or back by a number of legal balls, never below zero.
pub fn add_balls(overs: f64, delta: i32) -> Option<f64> {
    let balls = to_balls(overs)? as i64 + i64::from(delta);
    u32::try_from(balls.max(0)).ok().map(from_balls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_and_partial_overs_convert_to_balls() {
        assert_eq!(to_balls(0.0), Some(0));
        assert_eq!(to_balls(20.0), Some(120));
        assert_eq!(to_balls(19.2), Some(116));
        assert_eq!(to_balls(0.5), Some(5));
    }

    #[test]
    fn impossible_ball_digits_are_rejected() {
        assert_eq!(to_balls(19.6), None);
        assert_eq!(to_balls(3.25), None);
        assert_eq!(to_balls(-1.0), None);
        assert_eq!(to_balls(f64::NAN), None);
    }

    #[test]
    fn huge_overs_are_rejected_instead_of_overflowing() {
        assert_eq!(to_balls(1.0e9), None);
        assert_eq!(to_balls(f64::MAX), None);
        assert_eq!(to_balls(f64::INFINITY), None);
        assert_eq!(add_balls(1.0e9, 1), None);
        assert!(!is_valid(1.0e9));
    }

    #[test]
    fn adding_balls_rolls_over_into_the_next_over() {
        assert!((add_balls(3.5, 1).unwrap() - 4.0).abs() < EPSILON);
        assert!((add_balls(4.0, -1).unwrap() - 3.5).abs() < EPSILON);
        assert!((add_balls(0.0, -1).unwrap()).abs() < EPSILON);
        assert!((from_balls(116) - 19.2).abs() < EPSILON);
    }
}
