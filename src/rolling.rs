//! # Rolling Mean
//! Trailing mean over the last `window` samples, min-period 1: from the very
//! first sample the mean covers however many of the last `window` values
//! exist. This mirrors what the dashboard plots over sentiment scores.

use std::collections::VecDeque;

#[derive(Debug)]
pub struct RollingMean {
    window: usize,
    buf: VecDeque<f64>,
    sum: f64,
}

impl RollingMean {
    /// `window` must be at least 1.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            buf: VecDeque::with_capacity(window.max(1)),
            sum: 0.0,
        }
    }

    /// Push a sample and return the mean of the current window.
    pub fn push(&mut self, value: f64) -> f64 {
        self.buf.push_back(value);
        self.sum += value;
        if self.buf.len() > self.window {
            if let Some(old) = self.buf.pop_front() {
                self.sum -= old;
            }
        }
        self.sum / self.buf.len() as f64
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Trailing rolling mean of a whole series; output has the same length.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let mut rm = RollingMean::new(window);
    values.iter().map(|&v| rm.push(v)).collect()
}
