//! Smoothing window
//!
//! Bounded FIFO of recently gated labels. A label is trusted only once the
//! window holds at least `stability_threshold` copies of it.

use std::collections::VecDeque;

/// Stability window over recent labels
#[derive(Debug, Clone)]
pub struct SmoothingWindow {
    queue: VecDeque<String>,
    capacity: usize,
    stability_threshold: usize,
}

impl SmoothingWindow {
    pub fn new(capacity: usize, stability_threshold: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            stability_threshold,
        }
    }

    /// Push a label, evicting the oldest on overflow, and return how many
    /// window entries now equal it
    pub fn observe(&mut self, label: &str) -> usize {
        self.queue.push_back(label.to_string());
        while self.queue.len() > self.capacity {
            self.queue.pop_front();
        }
        self.queue.iter().filter(|l| *l == label).count()
    }

    /// Whether a stable count clears the threshold
    pub fn is_stable(&self, stable_count: usize) -> bool {
        stable_count >= self.stability_threshold
    }

    pub fn reset(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Window contents, oldest first
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }
}
