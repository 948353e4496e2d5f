use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::geometry;

pub const JOINT_COUNT: usize = 18;

/// Anatomical keypoint slots, in the detector's fixed output order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    Nose = 0,
    Neck = 1,
    LeftShoulder = 2,
    LeftElbow = 3,
    LeftWrist = 4,
    RightShoulder = 5,
    RightElbow = 6,
    RightWrist = 7,
    LeftHip = 8,
    LeftKnee = 9,
    LeftAnkle = 10,
    RightHip = 11,
    RightKnee = 12,
    RightAnkle = 13,
    LeftEye = 14,
    RightEye = 15,
    LeftEar = 16,
    RightEar = 17,
}

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Nose,
        Joint::Neck,
        Joint::LeftShoulder,
        Joint::LeftElbow,
        Joint::LeftWrist,
        Joint::RightShoulder,
        Joint::RightElbow,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::LeftKnee,
        Joint::LeftAnkle,
        Joint::RightHip,
        Joint::RightKnee,
        Joint::RightAnkle,
        Joint::LeftEye,
        Joint::RightEye,
        Joint::LeftEar,
        Joint::RightEar,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One detected human: 18 2-D keypoints in `Joint` order.
///
/// A point at (0, 0) means the joint was not detected. A real detection at
/// pixel (0, 0) is indistinguishable from absence; the convention is kept
/// for compatibility with the upstream detector.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Pose {
    points: [[f64; 2]; JOINT_COUNT],
}

impl Pose {
    pub fn new(points: [[f64; 2]; JOINT_COUNT]) -> Self {
        Self { points }
    }

    #[inline(always)]
    pub fn point(&self, joint: Joint) -> na::Point2<f64> {
        let [x, y] = self.points[joint.index()];
        na::Point2::new(x, y)
    }

    #[inline(always)]
    pub fn is_missing(&self, joint: Joint) -> bool {
        self.points[joint.index()] == [0.0, 0.0]
    }

    pub fn valid_joints(&self) -> impl Iterator<Item = Joint> + '_ {
        Joint::ALL.into_iter().filter(move |j| !self.is_missing(*j))
    }

    /// Mean distance of the detected points from `center`.
    ///
    /// A pose with zero detected points comes out at 0 / epsilon, i.e. ~0,
    /// and wins candidate selection by default.
    pub fn center_distance(&self, center: na::Point2<f64>) -> f64 {
        let mut sum = 0.0;
        let mut count = 0.0;

        for joint in self.valid_joints() {
            sum += geometry::distance(self.point(joint), center);
            count += 1.0;
        }

        sum / (count + f64::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> [[f64; 2]; JOINT_COUNT] {
        [[0.0, 0.0]; JOINT_COUNT]
    }

    #[test]
    fn sentinel_point_is_missing() {
        let mut points = empty();
        points[Joint::RightWrist.index()] = [120.0, 80.0];
        let pose = Pose::new(points);

        assert!(!pose.is_missing(Joint::RightWrist));
        assert!(pose.is_missing(Joint::LeftWrist));
        assert_eq!(pose.valid_joints().count(), 1);
    }

    #[test]
    fn right_wrist_sits_at_slot_seven() {
        assert_eq!(Joint::RightWrist.index(), 7);
    }

    #[test]
    fn undetected_pose_wins_selection_by_default() {
        let center = na::Point2::new(100.0, 100.0);

        let mut far = empty();
        far[Joint::Nose.index()] = [500.0, 500.0];

        let ghost = Pose::new(empty());
        let far = Pose::new(far);

        assert!(ghost.center_distance(center) < far.center_distance(center));
        assert!(ghost.center_distance(center).abs() < 1e-9);
    }
}
