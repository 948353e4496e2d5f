use crate::geometry;

/// Fixed length of every feature vector handed to a scoring model.
pub const FEATURE_BINS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    /// Zero-pad the slice to 120 entries and return it verbatim; the range
    /// is accepted but unused. The deployed scoring models were trained on
    /// exactly this layout.
    #[default]
    Passthrough,
    /// A real 120-bin count histogram over the unit range. Only for
    /// retraining experiments: the deployed models produce garbage on
    /// binned input.
    Binned,
}

/// Reduce one windowed trace slice to a fixed-length feature vector.
pub fn reduce(slice: &[f64], range: (f64, f64), mode: Reduction) -> Vec<f64> {
    match mode {
        Reduction::Passthrough => geometry::zero_pad(slice, FEATURE_BINS),
        Reduction::Binned => binned(slice, range),
    }
}

fn binned(slice: &[f64], (lo, hi): (f64, f64)) -> Vec<f64> {
    let mut bins = vec![0.0; FEATURE_BINS];
    let span = hi - lo;

    for &v in slice {
        if !v.is_finite() {
            continue;
        }

        let t = (v - lo) / span;
        if !(0.0..=1.0).contains(&t) {
            continue;
        }

        let bin = ((t * FEATURE_BINS as f64) as usize).min(FEATURE_BINS - 1);
        bins[bin] += 1.0;
    }

    bins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_pads_short_slices() {
        let out = reduce(&[1.5, 2.5], (0.0, 1.0), Reduction::Passthrough);
        assert_eq!(out.len(), FEATURE_BINS);
        assert_eq!(&out[..2], &[1.5, 2.5]);
        assert!(out[2..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn passthrough_ignores_the_range() {
        let slice = [7.0; 40];
        let a = reduce(&slice, (0.0, 1.0), Reduction::Passthrough);
        let b = reduce(&slice, (-100.0, 100.0), Reduction::Passthrough);
        assert_eq!(a, b);
    }

    #[test]
    fn passthrough_leaves_long_slices_unchanged() {
        let long: Vec<f64> = (0..150).map(|i| i as f64).collect();
        let out = reduce(&long, (0.0, 200.0), Reduction::Passthrough);
        assert_eq!(out, long);
    }

    #[test]
    fn binned_counts_values_into_range_buckets() {
        let out = reduce(&[0.0, 0.5, 0.5, 1.0], (0.0, 1.0), Reduction::Binned);
        assert_eq!(out.len(), FEATURE_BINS);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[60], 2.0);
        assert_eq!(out[FEATURE_BINS - 1], 1.0);
        assert_eq!(out.iter().sum::<f64>(), 4.0);
    }

    #[test]
    fn binned_skips_non_finite_and_out_of_range() {
        let out = reduce(
            &[f64::NAN, f64::INFINITY, -0.1, 1.1, 0.25],
            (0.0, 1.0),
            Reduction::Binned,
        );
        assert_eq!(out.iter().sum::<f64>(), 1.0);
        assert_eq!(out[30], 1.0);
    }
}
