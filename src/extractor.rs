use crate::frame::Frame;
use crate::geometry;
use crate::pose::{Joint, Pose};
use crate::trace::{CoordSlot, FrameRow, TraceSet};

/// Append one frame's measurements to the trace set.
///
/// A frame with no human appends a placeholder row; the traces never skip a
/// frame index.
pub fn process(frame: &Frame, traces: &mut TraceSet) {
    match select_server(frame) {
        Some(pose) => traces.push(measure(pose)),
        None => traces.push(FrameRow::missing()),
    }
}

/// Pick the candidate serving: the pose whose detected points sit closest,
/// on average, to the frame's geometric center.
pub fn select_server(frame: &Frame) -> Option<&Pose> {
    let center = frame.center();

    let mut best: Option<(&Pose, f64)> = None;
    for pose in frame.iter() {
        let dist = pose.center_distance(center);

        match best {
            Some((_, b)) if b <= dist => {}
            _ => best = Some((pose, dist)),
        }
    }

    if frame.len() > 1 {
        log::trace!("{} candidates in frame {}, nearest-to-center selected", frame.len(), frame.index);
    }

    best.map(|(pose, _)| pose)
}

/// Raw per-frame measurements for the selected pose. Sentinel (0, 0) joints
/// flow into the arithmetic unguarded; degenerate angles surface as NaN and
/// propagate downstream as missing data.
fn measure(pose: &Pose) -> FrameRow {
    let hip_mid = geometry::midpoint(pose.point(Joint::LeftHip), pose.point(Joint::RightHip));

    let angles = [
        geometry::angle2(pose.point(Joint::Neck), hip_mid),
        geometry::angle3(
            pose.point(Joint::LeftHip),
            pose.point(Joint::LeftKnee),
            pose.point(Joint::LeftAnkle),
        ),
        geometry::angle3(
            pose.point(Joint::RightHip),
            pose.point(Joint::RightKnee),
            pose.point(Joint::RightAnkle),
        ),
        geometry::angle2(pose.point(Joint::LeftShoulder), pose.point(Joint::LeftWrist)),
        geometry::angle2(pose.point(Joint::RightShoulder), pose.point(Joint::RightWrist)),
    ];

    let mut xs = [0.0; CoordSlot::COUNT];
    let mut ys = [0.0; CoordSlot::COUNT];
    for slot in CoordSlot::ALL {
        let p = pose.point(slot.joint());
        xs[slot as usize] = p.x;
        ys[slot as usize] = p.y;
    }

    let hands = [
        pose.point(Joint::LeftWrist).y,
        pose.point(Joint::RightWrist).y,
    ];

    let mut seen = [false; crate::pose::JOINT_COUNT];
    for joint in pose.valid_joints() {
        seen[joint.index()] = true;
    }

    FrameRow { angles, xs, ys, hands, seen }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::JOINT_COUNT;
    use crate::trace::{AngleTrace, Hand};

    fn pose_at(x: f64, y: f64) -> Pose {
        let mut points = [[0.0; 2]; JOINT_COUNT];
        for p in points.iter_mut() {
            *p = [x, y];
        }
        Pose::new(points)
    }

    fn frame(index: usize, poses: Vec<Pose>) -> Frame {
        Frame {
            index,
            dims: (640, 480),
            poses,
        }
    }

    #[test]
    fn nearest_candidate_wins() {
        // Frame center is (320, 240).
        let near = pose_at(300.0, 250.0);
        let far = pose_at(20.0, 20.0);
        let f = frame(0, vec![far, near.clone()]);

        let selected = select_server(&f).unwrap();
        assert_eq!(selected, &near);
    }

    #[test]
    fn pointless_candidate_wins_by_default() {
        let near = pose_at(310.0, 240.0);
        let ghost = Pose::new([[0.0; 2]; JOINT_COUNT]);
        let f = frame(0, vec![near, ghost.clone()]);

        let selected = select_server(&f).unwrap();
        assert_eq!(selected, &ghost);
    }

    #[test]
    fn empty_frame_appends_placeholder_row() {
        let mut traces = TraceSet::new();
        process(&frame(0, vec![]), &mut traces);

        assert_eq!(traces.len(), 1);
        assert!(traces.angle(AngleTrace::Back)[0].is_nan());
        assert!(traces.x(CoordSlot::LeftWrist)[0].is_nan());
        assert_eq!(traces.hand(Hand::Left)[0], 0.0);
        assert_eq!(traces.joints_seen(), 0);
    }

    #[test]
    fn detected_frame_fills_all_traces() {
        let mut traces = TraceSet::new();
        let mut points = [[0.0; 2]; JOINT_COUNT];
        for (i, p) in points.iter_mut().enumerate() {
            *p = [10.0 + i as f64, 20.0 + i as f64];
        }
        process(&frame(0, vec![Pose::new(points)]), &mut traces);

        assert_eq!(traces.len(), 1);
        assert_eq!(traces.joints_seen(), JOINT_COUNT);
        assert_eq!(
            traces.hand(Hand::Right)[0],
            20.0 + Joint::RightWrist.index() as f64
        );
        assert_eq!(
            traces.x(CoordSlot::LeftAnkle)[0],
            10.0 + Joint::LeftAnkle.index() as f64
        );
        assert!(traces.angle(AngleTrace::Back)[0].is_finite());
    }
}
