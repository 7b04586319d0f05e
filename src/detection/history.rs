use std::collections::VecDeque;

use crate::models::{Landmark, PoseFrame};

/// Bounded window of the most recent pose frames, oldest first.
#[derive(Debug, Clone)]
pub struct PoseHistory {
    frames: VecDeque<PoseFrame>,
    capacity: usize,
}

impl PoseHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a frame, evicting the oldest once the window is full.
    pub fn push(&mut self, frame: PoseFrame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn latest(&self) -> Option<&PoseFrame> {
        self.frames.back()
    }

    /// The frame just before the latest one.
    pub fn previous(&self) -> Option<&PoseFrame> {
        self.frames.len().checked_sub(2).and_then(|i| self.frames.get(i))
    }

    /// Positions of one joint over the last `samples` frames, oldest first.
    /// Frames where the joint is missing are left out.
    pub fn joint_path(&self, joint: usize, samples: usize) -> Vec<Landmark> {
        let skip = self.frames.len().saturating_sub(samples);
        self.frames
            .iter()
            .skip(skip)
            .filter_map(|frame| frame.landmark(joint).copied())
            .collect()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(x: f64, timestamp: f64) -> PoseFrame {
        PoseFrame::new(vec![Landmark::new(x, 0.5)], timestamp)
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut history = PoseHistory::new(3);
        for i in 0..5 {
            history.push(frame(i as f64 / 10.0, i as f64));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.latest().unwrap().timestamp, 4.0);
        assert_eq!(history.previous().unwrap().timestamp, 3.0);
        let xs: Vec<f64> = history.joint_path(0, 10).iter().map(|l| l.x).collect();
        assert_eq!(xs, vec![0.2, 0.3, 0.4]);
    }

    #[test]
    fn joint_path_limits_samples_and_skips_missing() {
        let mut history = PoseHistory::new(10);
        history.push(frame(0.1, 0.0));
        history.push(PoseFrame::new(Vec::new(), 1.0));
        history.push(frame(0.3, 2.0));
        history.push(frame(0.4, 3.0));

        let path = history.joint_path(0, 3);
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].x, 0.3);
    }
}
