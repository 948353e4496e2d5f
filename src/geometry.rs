use nalgebra as na;
use num_traits::Float;

/// Angle of the p1 -> p2 line measured from vertical, via atan(dx/dy).
///
/// A zero dy is not guarded: 0/0 yields NaN, which downstream stages treat
/// the same as a frame with no detection.
pub fn angle2<F>(p1: na::Point2<F>, p2: na::Point2<F>) -> F
where
    F: na::RealField + Float,
{
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;

    Float::atan(dx / dy)
}

/// Angle at the vertex p2 formed by the rays to p1 and p3, law of cosines
/// over squared distances.
///
/// The acos argument is not clamped to [-1, 1]; floating error on nearly
/// collinear points can push it outside the domain and the result is NaN.
pub fn angle3<F>(p1: na::Point2<F>, p2: na::Point2<F>, p3: na::Point2<F>) -> F
where
    F: na::RealField + Float,
{
    let a2 = na::distance_squared(&p2, &p1);
    let b2 = na::distance_squared(&p2, &p3);
    let c2 = na::distance_squared(&p1, &p3);

    let ab = Float::sqrt(a2) * Float::sqrt(b2);
    let two = F::from(2.0).unwrap();

    Float::acos((a2 + b2 - c2) / (ab * two))
}

#[inline]
pub fn distance<F>(p1: na::Point2<F>, p2: na::Point2<F>) -> F
where
    F: na::RealField + Float,
{
    na::distance(&p1, &p2)
}

#[inline]
pub fn midpoint<F>(p1: na::Point2<F>, p2: na::Point2<F>) -> na::Point2<F>
where
    F: na::RealField + Float,
{
    na::center(&p1, &p2)
}

/// Linear rescale into [0, 100] using the array's own min/max.
///
/// An all-equal input divides by zero; the resulting NaNs propagate rather
/// than abort, matching the rest of the numeric pipeline.
pub fn normalize_to_range(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values.iter().map(|v| (v - min) / span * 100.0).collect()
}

/// Right-pad with zeros to exactly `target` entries. Inputs already at or
/// beyond `target` are returned unchanged, not truncated.
pub fn zero_pad(values: &[f64], target: usize) -> Vec<f64> {
    if values.len() >= target {
        return values.to_vec();
    }

    let mut out = Vec::with_capacity(target);
    out.extend_from_slice(values);
    out.resize(target, 0.0);

    out
}

/// Replace runs of 0.0 with the most recent preceding non-zero value.
/// Leading zeros take the first non-zero value found anywhere in the array.
/// An all-zero array comes back unchanged.
pub fn interpolate_missing(values: &[f64]) -> Vec<f64> {
    let mut last = match values.iter().copied().find(|v| *v != 0.0) {
        Some(v) => v,
        None => return values.to_vec(),
    };

    let mut out = Vec::with_capacity(values.len());
    for &v in values {
        if v != 0.0 {
            last = v;
        }
        out.push(last);
    }

    out
}
