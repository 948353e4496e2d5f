use nalgebra as na;
use ndarray::Array2;
use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry;
use crate::histogram::{self, Reduction, FEATURE_BINS};
use crate::segmenter::{self, SegmenterConfig, ServeWindow};
use crate::trace::{Angle, AngleTrace, CoordSlot, Hand, Norm, Pixels, TraceSet, TraceUnit};
use crate::ScoreModel;

/// Joint slots that must be populated at least once across the video for
/// scoring to proceed.
pub const MIN_JOINTS: usize = 14;

/// The eight feedback categories, each scored by its own injected model.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    BackArch = 0,
    FeetSpacing = 1,
    BackLegKick = 2,
    JumpHeight = 3,
    LeftArmStraight = 4,
    LegBend = 5,
    ShoulderTiming = 6,
    TossHeight = 7,
}

impl Category {
    pub const COUNT: usize = 8;
    pub const ALL: [Category; Self::COUNT] = [
        Category::BackArch,
        Category::FeetSpacing,
        Category::BackLegKick,
        Category::JumpHeight,
        Category::LeftArmStraight,
        Category::LegBend,
        Category::ShoulderTiming,
        Category::TossHeight,
    ];

    /// Number of 120-entry feature rows this category's model takes.
    pub fn arity(self) -> usize {
        match self {
            Category::BackArch => 1,
            Category::FeetSpacing => 1,
            Category::BackLegKick => 4,
            Category::JumpHeight => 2,
            Category::LeftArmStraight => 1,
            Category::LegBend => 2,
            Category::ShoulderTiming => 5,
            Category::TossHeight => 2,
        }
    }
}

/// The per-category scoring models, injected by the host application.
pub struct ScoreBank {
    models: [Box<dyn ScoreModel + Send + Sync>; Category::COUNT],
}

impl ScoreBank {
    pub fn new(models: [Box<dyn ScoreModel + Send + Sync>; Category::COUNT]) -> Self {
        Self { models }
    }

    #[inline]
    pub fn model(&self, category: Category) -> &(dyn ScoreModel + Send + Sync) {
        self.models[category as usize].as_ref()
    }
}

/// One scored serve: the artifact handed to the persistence collaborator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServeScore {
    pub window: ServeWindow,
    /// Scores in `Category::ALL` order.
    pub scores: [f64; Category::COUNT],
}

impl ServeScore {
    #[inline]
    pub fn score(&self, category: Category) -> f64 {
        self.scores[category as usize]
    }
}

/// Segment and score every serve in the finished trace set.
///
/// The single validity gate runs first: too few joints ever detected aborts
/// before segmentation and no model is invoked. Past the gate, numeric
/// degeneracies (NaN angles, degenerate normalization) propagate into the
/// feature vectors rather than abort.
pub fn score_video(
    traces: &TraceSet,
    image_width: f64,
    config: &SegmenterConfig,
    reduction: Reduction,
    bank: &ScoreBank,
) -> Result<Vec<ServeScore>, Error> {
    let detected = traces.joints_seen();
    if detected < MIN_JOINTS {
        log::warn!(
            "only {} of {} joints detected across the video, no serve detected",
            detected,
            MIN_JOINTS
        );
        return Err(Error::InsufficientKeypoints {
            detected,
            required: MIN_JOINTS,
        });
    }

    let segmentation = segmenter::segment(
        traces.hand(Hand::Left),
        traces.hand(Hand::Right),
        config,
    );
    let windows = segmenter::windows(&segmentation, traces.len(), config);
    log::debug!("{} serve window(s) segmented", windows.len());

    Ok(windows
        .into_iter()
        .map(|window| score_window(traces, window, image_width, reduction, bank))
        .collect())
}

fn score_window(
    traces: &TraceSet,
    window: ServeWindow,
    image_width: f64,
    reduction: Reduction,
    bank: &ScoreBank,
) -> ServeScore {
    let features = WindowFeatures::build(traces, window, image_width, reduction);

    let mut scores = [0.0; Category::COUNT];
    for (slot, category) in scores.iter_mut().zip(Category::ALL) {
        *slot = bank.model(category).predict(features.matrix(category).view());
    }

    ServeScore { window, scores }
}

/// All reduced feature vectors of one serve window.
struct WindowFeatures {
    angles: [Vec<f64>; AngleTrace::COUNT],
    xs: [Vec<f64>; CoordSlot::COUNT],
    ys: [Vec<f64>; CoordSlot::COUNT],
    feet: Vec<f64>,
    shoulders: Vec<f64>,
}

impl WindowFeatures {
    fn build(
        traces: &TraceSet,
        window: ServeWindow,
        image_width: f64,
        reduction: Reduction,
    ) -> Self {
        let (start, end) = (window.start, window.end);

        let angles = AngleTrace::ALL.map(|trace| {
            let padded = geometry::zero_pad(&traces.angle(trace)[start..end], FEATURE_BINS);
            histogram::reduce(&padded, Angle::range(image_width), reduction)
        });

        let mut xs = CoordSlot::ALL.map(|slot| geometry::zero_pad(&traces.x(slot)[start..end], FEATURE_BINS));
        let mut ys = CoordSlot::ALL.map(|slot| geometry::zero_pad(&traces.y(slot)[start..end], FEATURE_BINS));

        // Shared min/max across every coordinate trace of this window keeps
        // the body's proportions; NaN entries drop out of the fold.
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for trace in xs.iter().chain(ys.iter()) {
            for &v in trace {
                min = min.min(v);
                max = max.max(v);
            }
        }

        let span = max - min;
        for trace in xs.iter_mut().chain(ys.iter_mut()) {
            for v in trace.iter_mut() {
                *v = (*v - min) / span;
            }
        }

        let feet = Self::span_trace(&xs, &ys, CoordSlot::LeftAnkle, CoordSlot::RightAnkle);
        let shoulders =
            Self::span_trace(&xs, &ys, CoordSlot::LeftShoulder, CoordSlot::RightShoulder);

        let xs = xs.map(|trace| histogram::reduce(&trace, Norm::range(image_width), reduction));
        let ys = ys.map(|trace| histogram::reduce(&trace, Norm::range(image_width), reduction));
        let feet = histogram::reduce(&feet, Pixels::range(image_width), reduction);
        let shoulders = histogram::reduce(&shoulders, Pixels::range(image_width), reduction);

        Self {
            angles,
            xs,
            ys,
            feet,
            shoulders,
        }
    }

    /// Per-frame distance between two joints over the normalized traces.
    fn span_trace(
        xs: &[Vec<f64>; CoordSlot::COUNT],
        ys: &[Vec<f64>; CoordSlot::COUNT],
        a: CoordSlot,
        b: CoordSlot,
    ) -> Vec<f64> {
        let (a, b) = (a as usize, b as usize);
        let n = xs[a].len();

        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push(geometry::distance(
                na::Point2::new(xs[a][i], ys[a][i]),
                na::Point2::new(xs[b][i], ys[b][i]),
            ));
        }

        out
    }

    /// Feature matrix for one category: `arity` rows of 120 entries. The
    /// shape is load-bearing for the trained models; a mismatch here is a
    /// programming error and aborts.
    fn matrix(&self, category: Category) -> Array2<f64> {
        let ls = CoordSlot::LeftShoulder as usize;
        let rs = CoordSlot::RightShoulder as usize;
        let lw = CoordSlot::LeftWrist as usize;
        let rw = CoordSlot::RightWrist as usize;
        let la = CoordSlot::LeftAnkle as usize;
        let ra = CoordSlot::RightAnkle as usize;

        let rows: Vec<&[f64]> = match category {
            Category::BackArch => vec![self.angles[AngleTrace::Back as usize].as_slice()],
            Category::FeetSpacing => vec![self.feet.as_slice()],
            Category::BackLegKick => vec![
                self.xs[la].as_slice(),
                self.ys[la].as_slice(),
                self.xs[ra].as_slice(),
                self.ys[ra].as_slice(),
            ],
            Category::JumpHeight => vec![self.ys[la].as_slice(), self.ys[ra].as_slice()],
            Category::LeftArmStraight => {
                vec![self.angles[AngleTrace::LeftArm as usize].as_slice()]
            }
            Category::LegBend => vec![
                self.angles[AngleTrace::LeftKnee as usize].as_slice(),
                self.angles[AngleTrace::RightKnee as usize].as_slice(),
            ],
            Category::ShoulderTiming => vec![
                self.xs[ls].as_slice(),
                self.ys[ls].as_slice(),
                self.xs[rs].as_slice(),
                self.ys[rs].as_slice(),
                self.shoulders.as_slice(),
            ],
            Category::TossHeight => vec![self.ys[lw].as_slice(), self.ys[rw].as_slice()],
        };

        assert_eq!(
            rows.len(),
            category.arity(),
            "feature arity mismatch for {:?}",
            category
        );

        let mut flat = Vec::with_capacity(rows.len() * FEATURE_BINS);
        for row in &rows {
            assert_eq!(
                row.len(),
                FEATURE_BINS,
                "feature row for {:?} is {} entries, expected {}",
                category,
                row.len(),
                FEATURE_BINS
            );
            flat.extend_from_slice(row);
        }

        Array2::from_shape_vec((rows.len(), FEATURE_BINS), flat)
            .expect("feature matrix shape")
    }
}
