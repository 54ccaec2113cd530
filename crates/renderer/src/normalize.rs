//! Linear min-max stretch of band samples to 8 bits.

/// Minimum and maximum of `data`, ignoring NaN. `None` if every sample is NaN.
pub fn nan_min_max(data: &[f32]) -> Option<(f32, f32)> {
    data.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}

/// Stretch samples linearly so the band minimum maps to 0 and the maximum
/// to 255.
///
/// A constant band (max == min) and an all-NaN band become all zeros. NaN
/// samples map to 0.
pub fn stretch_to_u8(data: &[f32]) -> Vec<u8> {
    let (min, max) = match nan_min_max(data) {
        Some((min, max)) if max > min => (min as f64, max as f64),
        _ => return vec![0; data.len()],
    };

    let range = max - min;
    data.iter()
        .map(|&v| {
            if v.is_nan() {
                0
            } else {
                // `as` saturates, so rounding error past 255 clamps
                ((v as f64 - min) / range * 255.0) as u8
            }
        })
        .collect()
}
