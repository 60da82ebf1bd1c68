//! Shared utility functions and traits

/// Extension trait for tracking minimum and maximum values in `Option<T>`.
///
/// Works for any `PartialOrd` type, so timing offsets in `f64` can be
/// tracked directly. Incomparable values (NaN) never replace a stored one.
///
/// # Example
///
/// ```
/// use counterstrafe_testkit::utils::MinMaxExt;
///
/// let mut min: Option<f64> = None;
/// let mut max: Option<f64> = None;
///
/// for ms in [4.5, -3.0, 12.0] {
///     min.update_min(ms);
///     max.update_max(ms);
/// }
/// assert_eq!(min, Some(-3.0));
/// assert_eq!(max, Some(12.0));
/// ```
pub trait MinMaxExt<T: PartialOrd + Copy> {
    /// Store `value` if it is smaller than the current minimum or if no
    /// minimum exists yet.
    fn update_min(&mut self, value: T);

    /// Store `value` if it is larger than the current maximum or if no
    /// maximum exists yet.
    fn update_max(&mut self, value: T);
}

impl<T: PartialOrd + Copy> MinMaxExt<T> for Option<T> {
    fn update_min(&mut self, value: T) {
        match self {
            Some(current) if value < *current => *current = value,
            Some(_) => {}
            None => *self = Some(value),
        }
    }

    fn update_max(&mut self, value: T) {
        match self {
            Some(current) if value > *current => *current = value,
            Some(_) => {}
            None => *self = Some(value),
        }
    }
}

/// Linear interpolation between two RGB colours, `t` clamped to [0, 1]
pub fn lerp_rgb(from: (u8, u8, u8), to: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    (
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}
