use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Too few joints ever detected across the video; reported before any
    /// segmentation or scoring happens.
    #[error("insufficient keypoints: only {detected} of {required} joints were ever detected")]
    InsufficientKeypoints { detected: usize, required: usize },

    /// The caller cancelled the per-frame pass.
    #[error("analysis cancelled")]
    Cancelled,
}
