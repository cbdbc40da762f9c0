use std::{fmt, net::IpAddr, time::Duration};

use thiserror::Error as ThisError;

use crate::{error::InputBuildError, target::Candidate};

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ProbeInput {
    pub candidate: Candidate,
    pub source: Option<IpAddr>,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct ProbeInputBuilder {
    candidate: Option<Candidate>,
    source: Option<IpAddr>,
}

impl ProbeInputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidate(mut self, candidate: Candidate) -> Self {
        self.candidate = Some(candidate);
        self
    }

    /// Pins the source address of the outgoing echo request.
    pub fn with_source(mut self, source: IpAddr) -> Self {
        self.source = Some(source);
        self
    }

    pub fn build(self) -> std::result::Result<ProbeInput, InputBuildError> {
        Ok(ProbeInput {
            candidate: self.candidate.ok_or(InputBuildError::MissingCandidate)?,
            source: self.source,
        })
    }
}

/// Why a candidate produced neither a reply nor a clean timeout.
#[derive(ThisError, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ProbeFailure {
    #[error("resolution failed: {0}")]
    Resolution(String),
    #[error("transport failed: {0}")]
    Transport(String),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ProbeStatus {
    /// A matching echo reply arrived within the wait bound.
    Reachable(Duration),
    /// The wait bound elapsed without a matching reply.
    Unreachable,
    Failed(ProbeFailure),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ProbeOutcome {
    pub candidate: Candidate,
    pub status: ProbeStatus,
}

impl ProbeOutcome {
    pub fn new(candidate: Candidate, status: ProbeStatus) -> Self {
        Self { candidate, status }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self.status, ProbeStatus::Reachable(_))
    }

    /// Round-trip time of the matching reply, if there was one.
    pub fn rtt(&self) -> Option<Duration> {
        match self.status {
            ProbeStatus::Reachable(rtt) => Some(rtt),
            _ => None,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            ProbeStatus::Reachable(rtt) => write!(f, "{} reachable in {:?}", self.candidate, rtt),
            ProbeStatus::Unreachable => write!(f, "{} unreachable", self.candidate),
            ProbeStatus::Failed(failure) => write!(f, "{} {}", self.candidate, failure),
        }
    }
}
