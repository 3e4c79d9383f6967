//! Error types for the editor

use crate::carousel::CarouselError;
use crate::drag::DragError;
use crate::mutations::MutationError;
use crate::upload::UploadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Carousel error: {0}")]
    Carousel(#[from] CarouselError),

    #[error("Drag error: {0}")]
    Drag(#[from] DragError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No carousel is selected")]
    NoCarouselSelected,
}
