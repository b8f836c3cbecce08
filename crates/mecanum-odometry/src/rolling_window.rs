//! Fixed-capacity moving average.
//!
//! Keeps the last `capacity` samples and a running sum, so [`RollingWindow::push`]
//! and [`RollingWindow::mean`] are O(1).  The running sum is rebuilt from the
//! retained samples once per full turn of the window to stop floating-point
//! drift from accumulating over long runs.
//!
//! # Example
//!
//! ```rust
//! use mecanum_odometry::rolling_window::RollingWindow;
//!
//! let mut window = RollingWindow::new(3);
//! for v in [1.0, 2.0, 3.0, 4.0] {
//!     window.push(v);
//! }
//! assert!((window.mean() - 3.0).abs() < 1e-12); // (2 + 3 + 4) / 3
//! ```

use std::collections::VecDeque;

use mecanum_types::OdomError;

/// Simple moving average over the most recent `capacity` samples.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: VecDeque<f64>,
    capacity: usize,
    sum: f64,
    evictions: usize,
}

impl RollingWindow {
    /// Create an empty window.  A `capacity` of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
            evictions: 0,
        }
    }

    /// Create an empty window, rejecting a zero `capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`OdomError::InvalidWindow`] when `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, OdomError> {
        if capacity == 0 {
            return Err(OdomError::InvalidWindow);
        }
        Ok(Self::new(capacity))
    }

    /// Record a sample, evicting the oldest one once the window is full.
    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity
            && let Some(oldest) = self.samples.pop_front()
        {
            self.sum -= oldest;
            self.evictions += 1;
        }
        self.samples.push_back(value);
        self.sum += value;

        if self.evictions >= self.capacity {
            self.sum = self.samples.iter().sum();
            self.evictions = 0;
        }
    }

    /// Arithmetic mean of the retained samples, or `0.0` when empty.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.sum / self.samples.len() as f64
    }

    /// Number of samples currently retained (at most [`capacity`][Self::capacity]).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every sample.  The capacity is unchanged.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.sum = 0.0;
        self.evictions = 0;
    }
}
