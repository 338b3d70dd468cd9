// Fixed-capacity FIFO of recent temperatures
use super::error::{MonitorError, Result};
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 10;

/// Keeps the most recent `capacity` readings in arrival order.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` must be non-zero; settings validation rejects zero before
    /// a window is ever built.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a reading, evicting the oldest one when the window is full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Arithmetic mean of the current contents. Undefined until full.
    /// Summed from the buffer on every call so no error carries over from
    /// readings that have already been evicted.
    pub fn average(&self) -> Result<f64> {
        if !self.is_full() {
            return Err(MonitorError::InsufficientData {
                have: self.values.len(),
                need: self.capacity,
            });
        }
        let sum: f64 = self.values.iter().sum();
        Ok(sum / self.capacity as f64)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_requires_full_window() {
        let mut window = RollingWindow::new();
        for _ in 0..9 {
            window.push(3.0);
        }

        assert!(!window.is_full());
        assert_eq!(
            window.average(),
            Err(MonitorError::InsufficientData { have: 9, need: 10 })
        );

        window.push(3.0);
        assert!(window.is_full());
        assert_eq!(window.average(), Ok(3.0));
    }

    #[test]
    fn test_eviction_is_fifo() {
        let mut window = RollingWindow::new();
        for _ in 0..10 {
            window.push(5.0);
        }
        assert_eq!(window.average(), Ok(5.0));

        // The first 5.0 drops out
        window.push(0.0);
        assert_eq!(window.len(), 10);
        assert_eq!(window.average(), Ok(4.5));
    }

    #[test]
    fn test_mixed_values() {
        let mut window = RollingWindow::new();
        for _ in 0..9 {
            window.push(2.0);
        }
        window.push(6.0);

        let avg = window.average().unwrap();
        assert!((avg - 2.4).abs() < 1e-9);
        assert_eq!(format!("{:.2}", avg), "2.40");
    }

    #[test]
    fn test_evicted_outlier_leaves_no_residue() {
        let mut window = RollingWindow::new();
        window.push(1e17);
        for _ in 0..30 {
            window.push(6.0);
        }
        assert_eq!(window.average(), Ok(6.0));
    }

    #[test]
    fn test_long_run_does_not_drift_past_threshold() {
        let mut window = RollingWindow::new();
        for i in 0..1_000_000u32 {
            window.push(2.0 + f64::from(i % 71) * 0.1);
        }
        for _ in 0..10 {
            window.push(5.5);
        }
        assert_eq!(window.average(), Ok(5.5));
    }

    #[test]
    fn test_custom_capacity() {
        let mut window = RollingWindow::with_capacity(3);
        window.push(1.0);
        window.push(2.0);
        assert!(window.average().is_err());

        window.push(3.0);
        window.push(4.0);
        assert_eq!(window.capacity(), 3);
        assert_eq!(window.average(), Ok(3.0));
    }
}
