//! Bilinear resampling helpers.
//!
//! Output pixel centres are mapped onto source pixel centres, so a 2x
//! downsample samples between source pixels rather than on their corners.

/// Longest edge of a band preview, in pixels.
pub const PREVIEW_MAX_DIM: u32 = 2048;

/// Preview size preserving aspect ratio, with the longer side equal to
/// `max_dim`. The shorter side is truncated and never less than one pixel.
pub fn preview_size(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    if width > height {
        let out_height = ((height as f64 / width as f64) * max_dim as f64) as u32;
        (max_dim, out_height.max(1))
    } else {
        let out_width = ((width as f64 / height as f64) * max_dim as f64) as u32;
        (out_width.max(1), max_dim)
    }
}

/// Source position of one output row or column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSample {
    /// Lower source index
    pub i0: usize,
    /// Upper source index (equal to `i0` on the last row/column)
    pub i1: usize,
    /// Weight of `i1`
    pub frac: f32,
}

/// Map every output index along one axis onto the source axis.
pub fn axis_samples(src_len: usize, dst_len: usize) -> Vec<AxisSample> {
    if src_len == 0 {
        return Vec::new();
    }
    let scale = src_len as f64 / dst_len as f64;
    let last = (src_len - 1) as f64;

    (0..dst_len)
        .map(|dst| {
            let pos = ((dst as f64 + 0.5) * scale - 0.5).clamp(0.0, last);
            let i0 = pos.floor() as usize;
            let i1 = (i0 + 1).min(src_len - 1);
            AxisSample {
                i0,
                i1,
                frac: (pos - i0 as f64) as f32,
            }
        })
        .collect()
}

/// Bilinear interpolation of four neighbours that skips NaN samples.
///
/// Weights of the valid neighbours are renormalized; if every neighbour is
/// NaN the result is NaN.
#[inline]
pub fn bilinear(v00: f32, v10: f32, v01: f32, v11: f32, fx: f32, fy: f32) -> f32 {
    let weights = [
        (v00, (1.0 - fx) * (1.0 - fy)),
        (v10, fx * (1.0 - fy)),
        (v01, (1.0 - fx) * fy),
        (v11, fx * fy),
    ];

    let mut sum = 0.0f32;
    let mut weight_sum = 0.0f32;
    for (value, weight) in weights {
        if !value.is_nan() && weight > 0.0 {
            sum += value * weight;
            weight_sum += weight;
        }
    }

    if weight_sum > 0.0 {
        sum / weight_sum
    } else {
        f32::NAN
    }
}

/// Interpolate one output row from the two source rows bracketing it.
pub fn interpolate_row(
    upper: &[f32],
    lower: &[f32],
    columns: &[AxisSample],
    fy: f32,
    out: &mut [f32],
) {
    for (dst, col) in out.iter_mut().zip(columns) {
        *dst = bilinear(
            upper[col.i0],
            upper[col.i1],
            lower[col.i0],
            lower[col.i1],
            col.frac,
            fy,
        );
    }
}
