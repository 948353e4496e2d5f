use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::ArrayView2;

use servetrack::{
    AnalyzerConfig, Category, Error, Frame, Joint, Pose, ScoreBank, ScoreModel, ServeAnalyzer,
};

struct CountingModel {
    calls: Arc<AtomicUsize>,
    score: f64,
}

impl ScoreModel for CountingModel {
    fn predict(&self, features: ArrayView2<'_, f64>) -> f64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(features.ncols(), 120);
        self.score
    }
}

fn counting_bank(calls: &Arc<AtomicUsize>, score: f64) -> ScoreBank {
    ScoreBank::new(std::array::from_fn(|_| {
        Box::new(CountingModel {
            calls: calls.clone(),
            score,
        }) as Box<dyn ScoreModel + Send + Sync>
    }))
}

/// A pose standing mid-frame whose wrists sit at the given height.
fn standing_pose(wrist_y: f64) -> Pose {
    let mut points = [[0.0; 2]; 18];
    for (i, p) in points.iter_mut().enumerate() {
        *p = [300.0 + 3.0 * i as f64, 180.0 + 5.0 * i as f64];
    }
    points[Joint::LeftWrist as usize] = [280.0, wrist_y];
    points[Joint::RightWrist as usize] = [360.0, wrist_y];
    Pose::new(points)
}

fn frame(index: usize, pose: Pose) -> Frame {
    Frame {
        index,
        dims: (640, 480),
        poses: vec![pose],
    }
}

#[test]
fn two_serves_are_segmented_and_scored() {
    let _ = env_logger::builder().is_test(true).try_init();

    // Calm wrists except two toss-like oscillation bursts.
    let mut analyzer = ServeAnalyzer::new(AnalyzerConfig::default());
    for i in 0..500 {
        let in_burst =
            (150..180).contains(&i) || (350..380).contains(&i);
        let wrist_y = if in_burst {
            if i % 2 == 0 {
                100.0
            } else {
                300.0
            }
        } else {
            200.0
        };
        analyzer.push_frame(&frame(i, standing_pose(wrist_y)));
    }
    assert_eq!(analyzer.frame_count(), 500);

    let calls = Arc::new(AtomicUsize::new(0));
    let bank = counting_bank(&calls, 3.0);
    let scores = analyzer.finish(&bank).unwrap();

    assert_eq!(scores.len(), 2, "windows: {:?}", scores);
    for score in &scores {
        assert_eq!(score.window.len(), 120);
        assert_eq!(score.scores, [3.0; Category::COUNT]);
    }
    // First serve starts shortly before its burst, second likewise.
    assert!(scores[0].window.start < 150);
    assert!(scores[0].window.end > 150);
    assert!(scores[1].window.start < 350 && scores[1].window.start > 250);
    assert_eq!(calls.load(Ordering::SeqCst), 2 * Category::COUNT);
}

#[test]
fn sparse_detections_never_reach_the_models() {
    let _ = env_logger::builder().is_test(true).try_init();

    // Only 10 of 18 joints ever detected.
    let mut analyzer = ServeAnalyzer::new(AnalyzerConfig::default());
    for i in 0..300 {
        let mut points = [[0.0; 2]; 18];
        for p in points.iter_mut().take(10) {
            *p = [320.0, 200.0 + i as f64];
        }
        analyzer.push_frame(&frame(i, Pose::new(points)));
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let bank = counting_bank(&calls, 3.0);

    match analyzer.finish(&bank) {
        Err(Error::InsufficientKeypoints { detected, required }) => {
            assert_eq!(detected, 10);
            assert_eq!(required, 14);
        }
        other => panic!("expected the keypoint gate to fire, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
