use thiserror::Error;

/// Errors that can occur before or around a render.
///
/// The per-ray kernel never fails; these cover configuration and the
/// worker threads.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Image has zero width or height")]
    EmptyImage,

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),
}

pub type RenderResult<T> = Result<T, RenderError>;
