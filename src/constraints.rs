//! Joint limits and the soft-limit check

/// Fraction of the limit range a joint may exceed the limits by before it is reported
/// as being at the limit.
pub const LIMIT_TOLERANCE: f64 = 1e-3;

/// Closed interval of allowed joint values (radians or meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    pub lower: f64,
    pub upper: f64,
}

impl JointLimits {
    /// Returns `None` if the limits are not finite or `lower > upper`.
    pub fn new(lower: f64, upper: f64) -> Option<Self> {
        if lower.is_finite() && upper.is_finite() && lower <= upper {
            Some(JointLimits { lower, upper })
        } else {
            None
        }
    }

    pub fn range(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn center(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    /// Absolute tolerance used by `is_at_limit`.
    pub fn tolerance(&self) -> f64 {
        LIMIT_TOLERANCE * self.range()
    }

    /// True if `q` lies outside the interval by more than the tolerance. This is an
    /// advisory: the value is not clamped or rejected.
    pub fn is_at_limit(&self, q: f64) -> bool {
        let tolerance = self.tolerance();
        q < self.lower - tolerance || q > self.upper + tolerance
    }

    /// Strict containment, no tolerance.
    pub fn contains(&self, q: f64) -> bool {
        q >= self.lower && q <= self.upper
    }
}
