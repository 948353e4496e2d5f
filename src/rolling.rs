use std::collections::VecDeque;

/// Windowed standard deviation with incremental sums.
#[derive(Debug, Clone)]
pub struct RollingStd {
    window: VecDeque<f64>,
    capacity: usize,
    sum: f64,
    sum_sq: f64,
}

impl RollingStd {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Push one sample; once the window is full, returns the population
    /// standard deviation of the current window.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.window.len() == self.capacity {
            if let Some(old) = self.window.pop_front() {
                self.sum -= old;
                self.sum_sq -= old * old;
            }
        }

        self.window.push_back(value);
        self.sum += value;
        self.sum_sq += value * value;

        if self.window.len() == self.capacity {
            Some(self.std())
        } else {
            None
        }
    }

    fn std(&self) -> f64 {
        let n = self.window.len() as f64;
        let mean = self.sum / n;

        // Incremental sums can leave the variance a hair below zero on
        // near-constant windows.
        (self.sum_sq / n - mean * mean).max(0.0).sqrt()
    }
}

/// Standard deviation of each length-`window` sliding window over `signal`.
///
/// The derived trace has length `signal.len() - 1 - window`; signals no
/// longer than `window + 1` produce an empty trace.
pub fn rolling_std(signal: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || signal.len() <= window + 1 {
        return Vec::new();
    }

    let count = signal.len() - 1 - window;
    let mut rolling = RollingStd::new(window);
    let mut out = Vec::with_capacity(count);

    for &value in signal {
        if let Some(std) = rolling.push(value) {
            out.push(std);
            if out.len() == count {
                break;
            }
        }
    }

    out
}
