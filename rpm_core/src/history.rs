//! Bounded deviation series for the wow/flutter trend graph.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct DeviationHistory {
    values: VecDeque<f64>,
    capacity: usize,
    jump_threshold_pct: f64,
}

impl DeviationHistory {
    pub fn new(capacity: usize, jump_threshold_pct: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
            jump_threshold_pct,
        }
    }

    pub fn append(&mut self, percent_deviation: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(percent_deviation);
    }

    /// Oldest first.
    pub fn values(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Index of the first entry after the most recent jump.
    ///
    /// Scans newest to oldest for adjacent entries more than the threshold
    /// apart and returns the later one's index. Renderers draw
    /// `[..idx]` as the previous segment and `[idx..]` as the current one.
    pub fn last_jump_index(&self) -> Option<usize> {
        (1..self.values.len())
            .rev()
            .find(|&i| (self.values[i] - self.values[i - 1]).abs() > self.jump_threshold_pct)
    }
}

impl Default for DeviationHistory {
    fn default() -> Self {
        Self::new(100, 15.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from(values: &[f64]) -> DeviationHistory {
        let mut h = DeviationHistory::default();
        for v in values {
            h.append(*v);
        }
        h
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut h = DeviationHistory::new(3, 15.0);
        for v in [1.0, 2.0, 3.0, 4.0] {
            h.append(v);
        }
        assert_eq!(h.values(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn jump_points_after_most_recent_gap() {
        // 20 -> 1 at index 4 is newer than 1 -> 20 at index 3
        assert_eq!(from(&[1.0, 1.0, 1.0, 20.0, 1.0, 1.0]).last_jump_index(), Some(4));
    }

    #[test]
    fn no_jump_cases() {
        assert_eq!(from(&[]).last_jump_index(), None);
        assert_eq!(from(&[50.0]).last_jump_index(), None);
        assert_eq!(from(&[0.0, 15.0, 0.0, -15.0]).last_jump_index(), None);
    }
}
