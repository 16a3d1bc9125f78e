// =============================================================================
// Rolling Mean — trailing window with an incremental sum
// =============================================================================
//
// Each push adds the new value to a running sum and subtracts the value that
// falls out of the window, so a full pass is O(n) regardless of the window
// length.
//
// The sum is Kahan-compensated on both the add and the remove side, which
// keeps the drift of long series to a few ulps.  On top of that the window
// tracks how many of its newest values are identical; once that run covers
// the whole window the mean is exactly that value.  A constant series then
// averages to its own price for every window length, and an all-zero
// window averages to exactly 0.0, which RSI relies on to detect a flat
// window.

use std::collections::VecDeque;

/// Trailing arithmetic mean over the last `period` pushed values.
#[derive(Debug, Clone)]
pub struct RollingMean {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
    compensation: f64,
    /// Length of the run of identical values at the back of the window.
    same_run: usize,
}

impl RollingMean {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0.0,
            compensation: 0.0,
            same_run: 0,
        }
    }

    /// Push the next value and return the mean once the window is full.
    ///
    /// A zero-length window never produces a value.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.period == 0 {
            return None;
        }

        self.same_run = match self.window.back() {
            Some(&last) if last == value => self.same_run + 1,
            _ => 1,
        };

        self.window.push_back(value);
        self.accumulate(value);

        if self.window.len() > self.period {
            if let Some(old) = self.window.pop_front() {
                self.accumulate(-old);
            }
        }

        if self.window.len() < self.period {
            return None;
        }

        if self.same_run >= self.period {
            return Some(value);
        }

        Some(self.sum / self.period as f64)
    }

    /// Kahan summation step.
    fn accumulate(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }
}

/// Rolling mean aligned with `values`: `None` for the first `period - 1`
/// positions.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut roller = RollingMean::new(period);
    values.iter().map(|&v| roller.push(v)).collect()
}
