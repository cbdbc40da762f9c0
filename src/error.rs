use thiserror::Error as ThisError;

use crate::probe::ProbeFailure;

pub type OpaqueError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("failed to resolve {host}, reason: {reason}")]
    Resolve { host: String, reason: String },
    #[error("interrupted")]
    Interrupted,
    #[error("all {count} probes failed, last reason: {last}")]
    AllFailed { count: usize, last: ProbeFailure },
    #[error(transparent)]
    Input(#[from] InputBuildError),
    #[error("{0}")]
    Opaque(#[from] OpaqueError),
}
pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputBuildError {
    #[error("candidate address is required")]
    MissingCandidate,
    #[error("base hostname or prefix must not be empty")]
    EmptyBase,
}
