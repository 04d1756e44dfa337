use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure category, independent of which stage raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    UnsupportedColorFormat,
    PointInsertionFailed,
    UpstreamUnavailable,
    Cancelled,
}

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Palette,
    Colorize { cluster: usize },
    Merge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Palette => write!(f, "palette generation"),
            Stage::Colorize { cluster } => write!(f, "colorization of cluster {cluster}"),
            Stage::Merge => write!(f, "merge"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported color format: {0}")]
    UnsupportedColorFormat(String),

    #[error("point insertion failed: {0}")]
    PointInsertionFailed(String),

    #[error("segmentation of source {source_id:?} failed: {source}")]
    UpstreamUnavailable {
        source_id: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("{stage}: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// The taxonomy kind, looking through any stage wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::UnsupportedColorFormat(_) => ErrorKind::UnsupportedColorFormat,
            Error::PointInsertionFailed(_) => ErrorKind::PointInsertionFailed,
            Error::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Error::Cancelled(_) => ErrorKind::Cancelled,
            Error::Stage { source, .. } => source.kind(),
        }
    }

    /// The innermost stage this error was tagged with, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, source } => source.stage().or(Some(*stage)),
            _ => None,
        }
    }

    pub fn in_stage(self, stage: Stage) -> Self {
        Error::Stage {
            stage,
            source: Box::new(self),
        }
    }
}
