use nalgebra as na;

use crate::pose::Pose;

/// One video frame's detections: zero or more humans.
pub struct Frame {
    pub index: usize,
    pub dims: (u32, u32),
    pub poses: Vec<Pose>,
}

impl Frame {
    #[inline]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Pose> {
        self.poses.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    #[inline]
    pub fn center(&self) -> na::Point2<f64> {
        let (w, h) = self.dims;

        na::Point2::new(w as f64 / 2.0, h as f64 / 2.0)
    }
}
