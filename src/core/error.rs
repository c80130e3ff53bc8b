// Copyright @yucwang 2026

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LumiereError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("obj parse error: {0}")]
    ObjParse(String),

    #[error("scene parse error: {0}")]
    SceneParse(String),

    #[error("scene is missing field: {0}")]
    MissingField(&'static str),

    #[error("at most one directional light is supported, found {count}")]
    TooManyDirectionalLights { count: usize },

    #[error("scene has no light sources")]
    NoLights,

    #[error("unknown gpu resource handle: {0}")]
    UnknownHandle(u32),

    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("exr error: {0}")]
    Exr(#[from] exr::error::Error),
}

pub type Result<T> = std::result::Result<T, LumiereError>;
