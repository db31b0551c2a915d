//! Helper functions

/// Checks if all elements in the array are finite
#[allow(dead_code)]
pub(crate) fn is_valid(qs: &[f64]) -> bool {
    qs.iter().all(|&q| q.is_finite())
}

/// Allows to specify joint values in degrees (converts to radians)
#[allow(dead_code)]
pub(crate) fn as_radians<const N: usize>(degrees: [f64; N]) -> [f64; N] {
    degrees.map(f64::to_radians)
}

/// formatting for YAML output
pub fn deg(x: &f64) -> String {
    if *x == 0.0 {
        return "0".to_string();
    }
    format!("deg({:.4})", x.to_degrees())
}
