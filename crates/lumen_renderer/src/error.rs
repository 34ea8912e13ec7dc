//! Renderer error type.

use lumen_core::{MeshError, TextureError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid scene: {0}")]
    InvalidScene(String),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("failed to encode image")]
    Image(#[from] image::ImageError),

    #[error("failed to write {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("image buffer holds {found} bytes, expected {expected}")]
    BufferSize { found: usize, expected: usize },
}

pub type RenderResult<T> = Result<T, RenderError>;
