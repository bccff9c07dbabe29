use std::collections::VecDeque;

/// Per-epoch loss values, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossHistory {
    values: VecDeque<f64>,
}

impl LossHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front: index 0 is always the latest epoch.
    pub fn record(&mut self, loss: f64) {
        self.values.push_front(loss);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn latest(&self) -> Option<f64> {
        self.get(0)
    }

    pub fn previous(&self) -> Option<f64> {
        self.get(1)
    }

    /// Newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Oldest to newest, for plotting a loss curve.
    pub fn chronological(&self) -> Vec<f64> {
        self.values.iter().rev().copied().collect()
    }
}

/// Hill-climbing step-size control.
///
/// Once two losses are recorded: halve the rate when the newest loss is
/// greater than the one before it, otherwise grow it by 5%. No bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveLearningRate {
    pub decay: f64,
    pub growth: f64,
}

impl AdaptiveLearningRate {
    pub const DECAY: f64 = 0.5;
    pub const GROWTH: f64 = 1.05;

    pub fn new() -> Self {
        AdaptiveLearningRate {
            decay: Self::DECAY,
            growth: Self::GROWTH,
        }
    }

    pub fn next_rate(&self, learning_rate: f64, history: &LossHistory) -> f64 {
        match (history.latest(), history.previous()) {
            (Some(latest), Some(previous)) if latest > previous => learning_rate * self.decay,
            (Some(_), Some(_)) => learning_rate * self.growth,
            _ => learning_rate,
        }
    }
}

impl Default for AdaptiveLearningRate {
    fn default() -> Self {
        Self::new()
    }
}
