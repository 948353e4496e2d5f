use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Sender;

use crate::error::Error;
use crate::frame::Frame;
use crate::scorer::{ScoreBank, ServeScore};
use crate::{AnalyzerConfig, ServeAnalyzer};

/// External pose-detection collaborator: yields one frame of detections at
/// a time, index-aligned with the video.
pub trait PoseSource: Send {
    fn frame_count(&self) -> usize;
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Progress events streamed back to the caller while the worker runs.
#[derive(Debug, Clone)]
pub enum Progress {
    Frame { index: usize, total: usize },
    Windows { count: usize },
    Serve { index: usize, score: ServeScore },
}

/// Handle to a running per-video analysis worker.
pub struct Analysis {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<Result<Vec<ServeScore>, Error>>>,
}

impl Analysis {
    /// Ask the worker to halt at the next frame boundary.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Wait for the worker and take its result.
    pub fn join(mut self) -> Result<Vec<ServeScore>, Error> {
        let handle = self.handle.take().expect("analysis already joined");
        match handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

impl Drop for Analysis {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Run the full pipeline for one video on a worker thread.
///
/// Progress sends never block the worker; a dropped receiver is ignored.
pub fn start_analysis<S>(
    mut source: S,
    bank: Arc<ScoreBank>,
    config: AnalyzerConfig,
    progress: Sender<Progress>,
) -> Analysis
where
    S: PoseSource + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        let total = source.frame_count();
        let mut analyzer = ServeAnalyzer::new(config);

        while let Some(frame) = source.next_frame() {
            if stop_flag.load(Ordering::SeqCst) {
                log::debug!("analysis cancelled at frame {}", analyzer.frame_count());
                return Err(Error::Cancelled);
            }

            let index = frame.index;
            analyzer.push_frame(&frame);
            let _ = progress.send(Progress::Frame { index, total });
        }

        let scores = analyzer.finish(&bank)?;

        let _ = progress.send(Progress::Windows {
            count: scores.len(),
        });
        for (index, score) in scores.iter().enumerate() {
            let _ = progress.send(Progress::Serve {
                index,
                score: score.clone(),
            });
        }

        Ok(scores)
    });

    Analysis {
        stop,
        handle: Some(handle),
    }
}
