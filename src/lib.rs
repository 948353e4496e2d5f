pub mod driver;
pub mod error;
pub mod extractor;
pub mod frame;
pub mod geometry;
pub mod histogram;
pub mod pose;
pub mod scorer;
pub mod segmenter;
pub mod trace;

mod rolling;

pub use error::Error;
pub use frame::Frame;
pub use histogram::Reduction;
pub use pose::{Joint, Pose};
pub use scorer::{Category, ScoreBank, ServeScore};
pub use segmenter::{SegmenterConfig, ServeWindow};
pub use trace::Hand;

use ndarray::ArrayView2;

use trace::TraceSet;

/// One category's scoring model: a fixed-arity stack of 120-entry feature
/// vectors in, an ordinal score out. Implemented by the host application
/// around its trained models.
pub trait ScoreModel {
    fn predict(&self, features: ArrayView2<'_, f64>) -> f64;
}

#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    pub segmenter: SegmenterConfig,
    pub reduction: Reduction,
}

/// Drives the pipeline for one video: feed frames in order, then finish.
///
/// The traces accumulate append-only while frames stream in and are
/// dropped with the analyzer once the video's serves are scored.
pub struct ServeAnalyzer {
    config: AnalyzerConfig,
    traces: TraceSet,
    dims: (u32, u32),
}

impl ServeAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            traces: TraceSet::new(),
            dims: (0, 0),
        }
    }

    pub fn push_frame(&mut self, frame: &Frame) {
        if self.traces.is_empty() {
            self.dims = frame.dims;
        }

        extractor::process(frame, &mut self.traces);
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.traces.len()
    }

    /// Segment and score every serve, consuming the accumulated traces.
    pub fn finish(self, bank: &ScoreBank) -> Result<Vec<ServeScore>, Error> {
        scorer::score_video(
            &self.traces,
            self.dims.0 as f64,
            &self.config.segmenter,
            self.config.reduction,
            bank,
        )
    }
}
