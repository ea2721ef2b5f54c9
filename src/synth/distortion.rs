//! Foldback distortion
//!
//! Instead of clipping at the threshold, the signal is reflected back into
//! range. Past the threshold the transfer curve is a triangle wave with
//! period `4 * threshold`, so larger inputs keep folding rather than
//! saturating.

/// Fold `sample` back below `threshold`
///
/// Inputs within the threshold pass through unchanged. A non-positive
/// threshold has no defined fold and returns silence.
#[inline]
pub fn fold(sample: f32, threshold: f32) -> f32 {
    if sample.abs() <= threshold {
        return sample;
    }
    if threshold <= 0.0 {
        return 0.0;
    }

    let wrapped = (sample - threshold).rem_euclid(threshold * 4.0);
    (wrapped - threshold * 2.0).abs() - threshold
}
