use std::path::PathBuf;

/// Errors surfaced by the download pipeline.
///
/// Nothing in the pipeline downgrades or retries these: the first one raised
/// inside a batch aborts that batch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network failure, timeout or non-success status while fetching `url`.
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: tower::BoxError,
    },

    /// The response body for `url` is not a decodable image.
    #[error("failed to decode image {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    #[error("chapter {chapter} is not available")]
    ChapterNotFound { chapter: u32 },

    /// The chapter page listed no page images.
    #[error("chapter {chapter} has no pages")]
    NoPages { chapter: u32 },

    #[error("failed to encode page {page}: {source}")]
    Encode {
        page: usize,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to build pdf: {0}")]
    Pack(#[from] lopdf::Error),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn transport(url: impl Into<String>, source: impl Into<tower::BoxError>) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
