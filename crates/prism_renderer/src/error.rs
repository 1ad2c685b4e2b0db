use thiserror::Error;

/// Errors returned by [`crate::Renderer`].
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid render settings: {0}")]
    InvalidSettings(String),

    #[error("failed to start render workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("render cancelled after {completed} of {total} work units")]
    Cancelled { completed: usize, total: usize },
}
