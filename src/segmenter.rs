use serde_derive::{Deserialize, Serialize};

use crate::geometry;
use crate::rolling;
use crate::trace::Hand;

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Rolling standard-deviation window over the prepped hand signal.
    pub smooth_window: usize,
    /// Sliding window length for peak detection over the variance trace.
    pub peak_window: usize,
    /// Minimum jump in sorted peak magnitude that separates serve peaks
    /// from incidental hand-motion noise.
    pub subtraction_threshold: f64,
    /// Maximum frame disagreement for the two hands to corroborate a peak.
    pub index_difference: usize,
    /// Frames kept before a serve-start peak.
    pub before_margin: usize,
    /// Frames kept after a serve-start peak.
    pub after_margin: usize,
    /// Which hand's corroborated indices become the serve starts.
    pub dominant: Hand,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            smooth_window: 50,
            peak_window: 60,
            subtraction_threshold: 10.0,
            index_difference: 60,
            before_margin: 20,
            after_margin: 100,
            dominant: Hand::Right,
        }
    }
}

/// One candidate serve: `[start, end)` slice bounds into the video traces.
///
/// Windows come out in temporal order and may overlap.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeWindow {
    pub start: usize,
    pub end: usize,
}

impl ServeWindow {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeakOutcome {
    /// Variance trace too short to scan; the caller treats the whole video
    /// as one serve.
    Degenerate,
    Peaks(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segmentation {
    /// No usable peaks; the entire video counts as exactly one serve.
    WholeVideo,
    /// Corroborated serve-start indices of the dominant hand, in temporal
    /// order.
    Starts(Vec<usize>),
}

/// Detect serve-start boundaries from the two wrist-height traces.
pub fn segment(left: &[f64], right: &[f64], config: &SegmenterConfig) -> Segmentation {
    if left.is_empty() || right.is_empty() {
        log::debug!("empty hand trace, treating the whole video as one serve");
        return Segmentation::WholeVideo;
    }

    let left_peaks = hand_peaks(left, config);
    let right_peaks = hand_peaks(right, config);

    let (left_peaks, right_peaks) = match (left_peaks, right_peaks) {
        (PeakOutcome::Peaks(l), PeakOutcome::Peaks(r)) if !l.is_empty() && !r.is_empty() => (l, r),
        _ => {
            log::debug!("degenerate peak detection, treating the whole video as one serve");
            return Segmentation::WholeVideo;
        }
    };

    let (kept_left, kept_right) = reconcile(&left_peaks, &right_peaks, config.index_difference);
    let starts = match config.dominant {
        Hand::Left => kept_left,
        Hand::Right => kept_right,
    };

    if starts.is_empty() {
        log::debug!("no corroborated peaks between hands, treating the whole video as one serve");
        return Segmentation::WholeVideo;
    }

    Segmentation::Starts(starts)
}

fn hand_peaks(trace: &[f64], config: &SegmenterConfig) -> PeakOutcome {
    let prepped = geometry::normalize_to_range(&geometry::interpolate_missing(trace));
    let variance = rolling::rolling_std(&prepped, config.smooth_window);

    detect_peaks(&variance, config.peak_window, config.subtraction_threshold)
}

/// Stable-maximum peak detection over a variance trace.
///
/// The trace is padded with `window` zeros on both sides and scanned with a
/// length-`window` sliding window one step at a time. The incumbent window
/// maximum accumulates "life" for every consecutive shift it survives; an
/// incumbent that lasts `window - 1` shifts is a peak. Peaks are then split
/// on the single largest gap in sorted magnitude: a gap of at least
/// `subtraction_threshold` marks everything below it as noise.
pub fn detect_peaks(trace: &[f64], window: usize, subtraction_threshold: f64) -> PeakOutcome {
    if trace.len() <= window {
        return PeakOutcome::Degenerate;
    }

    let mut padded = vec![0.0; trace.len() + 2 * window];
    padded[window..window + trace.len()].copy_from_slice(trace);

    let mut peaks: Vec<(f64, usize)> = Vec::new();
    let mut best_idx = usize::MAX;
    let mut best_val = f64::NEG_INFINITY;
    let mut life = 0usize;

    for start in 0..=padded.len() - window {
        let mut idx = start;
        let mut val = f64::NEG_INFINITY;
        for (i, &v) in padded[start..start + window].iter().enumerate() {
            // NaN never wins the comparison; an all-NaN window keeps
            // resetting the incumbent and no peak can form.
            if v > val {
                val = v;
                idx = start + i;
            }
        }

        if idx == best_idx && val == best_val {
            life += 1;
        } else {
            best_idx = idx;
            best_val = val;
            life = 0;
        }

        // The peak must lie in the unpadded trace.
        if life == window - 1 && best_idx >= window && best_idx < window + trace.len() {
            peaks.push((best_val, best_idx - window));
            life = 0;
        }
    }

    if peaks.len() < 2 {
        return PeakOutcome::Peaks(peaks.into_iter().map(|(_, idx)| idx).collect());
    }

    peaks.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut gap_at = 0;
    let mut gap = f64::NEG_INFINITY;
    for i in 1..peaks.len() {
        let d = peaks[i].0 - peaks[i - 1].0;
        if d > gap {
            gap = d;
            gap_at = i;
        }
    }

    let kept = if gap < subtraction_threshold {
        &peaks[..]
    } else {
        &peaks[gap_at..]
    };

    let mut indices: Vec<usize> = kept.iter().map(|(_, idx)| *idx).collect();
    indices.sort_unstable();

    PeakOutcome::Peaks(indices)
}

/// Two-cursor reconciliation of the per-hand peak index lists.
///
/// Peaks agreeing within `index_difference` frames corroborate each other
/// and advance both cursors; a lagging peak on either side is noise and is
/// skipped. Leftovers after one list runs out are discarded. Returns the
/// kept indices of each hand.
pub fn reconcile(
    left: &[usize],
    right: &[usize],
    index_difference: usize,
) -> (Vec<usize>, Vec<usize>) {
    let mut kept_left = Vec::new();
    let mut kept_right = Vec::new();

    let mut i = 0;
    let mut j = 0;
    while i < left.len() && j < right.len() {
        let diff = left[i] as i64 - right[j] as i64;

        if diff.abs() < index_difference as i64 {
            kept_left.push(left[i]);
            kept_right.push(right[j]);
            i += 1;
            j += 1;
        } else if diff > 0 {
            // The left hand is ahead: this right peak matches no left
            // event.
            j += 1;
        } else {
            i += 1;
        }
    }

    (kept_left, kept_right)
}

/// Expand serve-start indices into trace windows.
pub fn windows(
    segmentation: &Segmentation,
    frame_count: usize,
    config: &SegmenterConfig,
) -> Vec<ServeWindow> {
    match segmentation {
        Segmentation::WholeVideo => vec![ServeWindow {
            start: 0,
            end: frame_count.saturating_sub(1),
        }],
        Segmentation::Starts(starts) => starts
            .iter()
            .map(|&p| ServeWindow {
                start: p.saturating_sub(config.before_margin),
                end: (p + config.after_margin).min(frame_count.saturating_sub(1)),
            })
            .collect(),
    }
}
