//! Expansion of a base hostname or prefix into the candidates of a /24-style range.

use std::{fmt, net::IpAddr, ops::RangeInclusive};

use crate::{
    constants::{FIRST_HOST_SUFFIX, LAST_HOST_SUFFIX},
    error::InputBuildError,
    probe::{ProbeInput, ProbeInputBuilder},
};

/// Suffixes appended to the base when no explicit range is given.
pub const HOST_SUFFIXES: RangeInclusive<u16> = FIRST_HOST_SUFFIX..=LAST_HOST_SUFFIX;

/// Echo protocol a candidate is probed with.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum EchoProtocol {
    Icmpv4,
    Icmpv6,
}

impl EchoProtocol {
    pub fn matches(&self, addr: &IpAddr) -> bool {
        match self {
            EchoProtocol::Icmpv4 => addr.is_ipv4(),
            EchoProtocol::Icmpv6 => addr.is_ipv6(),
        }
    }
}

impl fmt::Display for EchoProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EchoProtocol::Icmpv4 => write!(f, "ip4:icmp"),
            EchoProtocol::Icmpv6 => write!(f, "ip6:ipv6-icmp"),
        }
    }
}

/// A single address string to probe.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Candidate(String);

impl Candidate {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// IPv6 candidates are recognised by a colon anywhere in the string.
    pub fn protocol(&self) -> EchoProtocol {
        if self.0.contains(':') {
            EchoProtocol::Icmpv6
        } else {
            EchoProtocol::Icmpv4
        }
    }
}

impl From<&str> for Candidate {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Candidate {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Expands `base` over [`HOST_SUFFIXES`].
///
/// # Example
/// ```
/// use async_icmp_sweep::target;
///
/// let candidates = target::expand("192.168.10.").unwrap();
/// assert_eq!(candidates.len(), 254);
/// assert_eq!(candidates[0].as_str(), "192.168.10.1");
/// ```
pub fn expand(base: &str) -> Result<Vec<Candidate>, InputBuildError> {
    expand_range(base, HOST_SUFFIXES)
}

/// Appends every suffix of `suffixes`, in ascending order, to `base`.
pub fn expand_range(
    base: &str,
    suffixes: RangeInclusive<u16>,
) -> Result<Vec<Candidate>, InputBuildError> {
    if base.is_empty() {
        return Err(InputBuildError::EmptyBase);
    }
    Ok(suffixes
        .map(|suffix| Candidate(format!("{}{}", base, suffix)))
        .collect())
}

/// Expands `base` and wraps every candidate into a [`ProbeInput`] sharing the same source override.
pub fn probe_inputs(
    base: &str,
    source: Option<IpAddr>,
) -> Result<Vec<ProbeInput>, InputBuildError> {
    expand(base)?
        .into_iter()
        .map(|candidate| {
            let builder = ProbeInputBuilder::new().with_candidate(candidate);
            let builder = match source {
                Some(source) => builder.with_source(source),
                None => builder,
            };
            builder.build()
        })
        .collect()
}
