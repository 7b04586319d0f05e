use crate::models::Trajectory;

use super::config::DetectorConfig;
use super::history::PoseHistory;

/// Coarse shape of a joint's recent path.
///
/// Looks at the last `trajectory_window` positions of `joint`. A full window
/// whose midpoint strays horizontally from the first-to-last chord by more
/// than `circular_margin` is circular. Otherwise a dominant vertical
/// displacement gives upward/downward (image `y` grows downward), and
/// anything else is straight. Fewer than three samples are straight.
pub fn analyze_trajectory(history: &PoseHistory, joint: usize, config: &DetectorConfig) -> Trajectory {
    let path = history.joint_path(joint, config.trajectory_window);
    if path.len() < 3 {
        return Trajectory::Straight;
    }

    let first = path[0];
    let last = path[path.len() - 1];
    let dx = last.x - first.x;
    let dy = last.y - first.y;

    if path.len() >= config.trajectory_window {
        let mid_index = path.len() / 2;
        let t = mid_index as f64 / (path.len() - 1) as f64;
        let chord_x = first.x + dx * t;
        if (path[mid_index].x - chord_x).abs() > config.circular_margin {
            return Trajectory::Circular;
        }
    }

    if dy.abs() > config.vertical_dominance * dx.abs() {
        if dy < 0.0 {
            Trajectory::Upward
        } else {
            Trajectory::Downward
        }
    } else {
        Trajectory::Straight
    }
}
