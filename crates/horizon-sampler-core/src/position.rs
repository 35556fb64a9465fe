//! Positions and domain clamping.
//!
//! A [`Position`] is a real-valued coordinate into a data source's domain.
//! The sentinel [`UNDEFINED`] (not-a-number) stands for "no position" or
//! "unbounded" wherever a position or a real value is expected.

/// A real-valued coordinate into a streamable's domain.
pub type Position = f64;

/// The "no value / unbounded" sentinel.
pub const UNDEFINED: Position = f64::NAN;

/// Returns `true` if the position is the [`UNDEFINED`] sentinel.
#[inline]
pub fn is_undefined(pos: Position) -> bool {
    pos.is_nan()
}

/// Clamp `pos` into `[departure, arrival]`.
///
/// An undefined `arrival` means the domain is unbounded above; an undefined
/// `departure` means it is unbounded below. An undefined `pos` stays
/// undefined.
pub fn clamp(pos: Position, departure: Position, arrival: Position) -> Position {
    if is_undefined(pos) {
        return UNDEFINED;
    }
    let lo = if is_undefined(departure) {
        f64::NEG_INFINITY
    } else {
        departure
    };
    let hi = if is_undefined(arrival) {
        f64::INFINITY
    } else {
        arrival
    };
    pos.max(lo).min(hi)
}

/// Convert a position to a discrete sample index in `[0, bound - 1]`.
///
/// Positions are rounded to the nearest sample. Returns `None` for an
/// undefined position or an empty axis.
pub fn to_index(pos: Position, bound: usize) -> Option<usize> {
    if is_undefined(pos) || bound == 0 {
        return None;
    }
    let last = (bound - 1) as f64;
    Some(pos.round().max(0.0).min(last) as usize)
}

/// The last position on an axis of `bound` samples.
///
/// An empty axis collapses onto the departure position.
#[inline]
pub fn last_position(bound: usize) -> Position {
    bound.saturating_sub(1) as Position
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_bounded() {
        assert_eq!(clamp(-1.0, 0.0, 4.0), 0.0);
        assert_eq!(clamp(5.0, 0.0, 4.0), 4.0);
        assert_eq!(clamp(2.5, 0.0, 4.0), 2.5);
    }

    #[test]
    fn test_clamp_unbounded_arrival() {
        assert_eq!(clamp(1e9, 0.0, UNDEFINED), 1e9);
        assert_eq!(clamp(-3.0, 0.0, UNDEFINED), 0.0);
    }

    #[test]
    fn test_clamp_undefined_position() {
        assert!(is_undefined(clamp(UNDEFINED, 0.0, 4.0)));
    }

    #[test]
    fn test_to_index_rounds_and_clamps() {
        assert_eq!(to_index(1.4, 5), Some(1));
        assert_eq!(to_index(1.5, 5), Some(2));
        assert_eq!(to_index(-2.0, 5), Some(0));
        assert_eq!(to_index(10.0, 5), Some(4));
        assert_eq!(to_index(0.0, 0), None);
        assert_eq!(to_index(UNDEFINED, 5), None);
    }

    #[test]
    fn test_last_position() {
        assert_eq!(last_position(5), 4.0);
        assert_eq!(last_position(0), 0.0);
    }
}
