use std::path::PathBuf;

/// Everything that can go wrong while configuring or running a slicing batch.
///
/// Per-image variants (`ImageDecode`, `CreateDir`, `SliceWrite`, `EmptySlice`)
/// never escape a run; the runner turns them into `fail (<cause>)` log lines
/// using this type's `Display` text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid slice configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot decode {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write slice {}: {source}", path.display())]
    SliceWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("slice {index} is empty after clamping")]
    EmptySlice { index: usize },

    #[error("cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("a slicing run is already active")]
    Busy,

    #[error("cannot start slicing worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("slicing worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
