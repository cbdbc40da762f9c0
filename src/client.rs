use std::{sync::Arc, time::Duration};

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::{
    constants::{DEFAULT_COLLECT_MARGIN, DEFAULT_MAX_WAIT, DEFAULT_RESOLVE_TIMEOUT},
    error::{Error, Result},
    icmp::IcmpTransport,
    pending::PendingSet,
    probe::{ProbeFailure, ProbeInput, ProbeOutcome, ProbeStatus},
    target::Candidate,
    transport::{Transport, TransportConfig, TransportHandle, TransportMode},
};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bound on how long a probe may wait for its reply.
    pub max_wait: Duration,
    /// Raw or datagram ICMP sockets.
    pub mode: TransportMode,
    /// Bound on resolving a candidate to an address.
    pub resolve_timeout: Duration,
    /// Slack added on top of the per-candidate bound before a sweep stops collecting.
    pub collect_margin: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfigBuilder::new().build()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    max_wait: Duration,
    mode: TransportMode,
    resolve_timeout: Duration,
    collect_margin: Duration,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            max_wait: DEFAULT_MAX_WAIT,
            mode: TransportMode::default(),
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            collect_margin: DEFAULT_COLLECT_MARGIN,
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_mode(mut self, mode: TransportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn with_collect_margin(mut self, margin: Duration) -> Self {
        self.collect_margin = margin;
        self
    }

    pub fn build(self) -> ClientConfig {
        ClientConfig {
            max_wait: self.max_wait,
            mode: self.mode,
            resolve_timeout: self.resolve_timeout,
            collect_margin: self.collect_margin,
        }
    }
}

/// Supervises single-candidate echo probes.
///
/// Every call to [`Client::probe`] resolves its candidate, starts a fresh transport loop for
/// the resulting address and waits for whichever comes first: a matching reply, the end of
/// the wait bound, a transport failure, or cancellation of the shared token.
///
/// # Example
/// ```no_run
/// use async_icmp_sweep::{Candidate, Client, ClientConfigBuilder, IcmpTransport, ProbeInputBuilder};
/// use tokio_util::sync::CancellationToken;
///
/// let input = ProbeInputBuilder::new()
///     .with_candidate(Candidate::from("192.168.10.1"))
///     .build()
///     .expect("Failed to build probe input");
/// tokio_test::block_on(async {
///     let client = Client::new(IcmpTransport, ClientConfigBuilder::new().build(), CancellationToken::new());
///     let outcome = client.probe(input).await.unwrap();
///     println!("{}", outcome);
/// })
/// ```
#[derive(Debug)]
pub struct Client<T: Transport = IcmpTransport> {
    transport: Arc<T>,
    config: ClientConfig,
    token: CancellationToken,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, config: ClientConfig, token: CancellationToken) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
            token,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The token whose cancellation interrupts every probe of this client.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Runs one probe attempt for the candidate in `input`.
    ///
    /// Resolution and transport failures are reported as [`ProbeStatus::Failed`] for this
    /// candidate only.
    ///
    /// # Errors
    /// Returns [`Error::Interrupted`] if the token is cancelled before the probe settles.
    pub async fn probe(&self, input: ProbeInput) -> Result<ProbeOutcome> {
        let candidate = input.candidate;
        let addr = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Err(Error::Interrupted),
            resolved = tokio::time::timeout(
                self.config.resolve_timeout,
                self.transport.resolve(candidate.as_str(), candidate.protocol()),
            ) => match resolved {
                Ok(Ok(addr)) => addr,
                Ok(Err(err)) => return Ok(Self::failed(candidate, ProbeFailure::Resolution(err.to_string()))),
                Err(_) => return Ok(Self::failed(
                    candidate,
                    ProbeFailure::Resolution(format!("timed out after {:?}", self.config.resolve_timeout)),
                )),
            },
        };

        let mut pending = PendingSet::new();
        pending.register(addr);
        let config = TransportConfig {
            max_wait: self.config.max_wait,
            mode: self.config.mode,
            source: input.source,
        };
        let mut transport =
            TransportHandle::start(Arc::clone(&self.transport), config, pending.targets());

        // Replies are queued before the loop finishes, so polling them ahead of `finished`
        // keeps a late reply from losing to idle.
        let status = loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    transport.stop();
                    return Err(Error::Interrupted);
                },
                Some(reply) = transport.replies.recv() => {
                    if pending.resolve(&reply.addr) {
                        debug!("{} replied in {:?}", candidate, reply.rtt);
                        break ProbeStatus::Reachable(reply.rtt);
                    }
                    debug!("ignoring reply from {} while probing {}", reply.addr, candidate);
                },
                finished = &mut transport.finished => match finished {
                    Ok(Ok(())) => {
                        for addr in pending.drain_unresolved() {
                            debug!("{} ({}) did not reply", candidate, addr);
                        }
                        break ProbeStatus::Unreachable;
                    }
                    Ok(Err(err)) => break ProbeStatus::Failed(ProbeFailure::Transport(err.to_string())),
                    Err(_) => {
                        break ProbeStatus::Failed(ProbeFailure::Transport(
                            "transport loop ended without a result".into(),
                        ))
                    }
                },
            }
        };
        transport.stop();

        let outcome = ProbeOutcome::new(candidate, status);
        if let ProbeStatus::Failed(failure) = &outcome.status {
            warn!("probe of {} failed: {}", outcome.candidate, failure);
        }
        Ok(outcome)
    }

    fn failed(candidate: Candidate, failure: ProbeFailure) -> ProbeOutcome {
        warn!("probe of {} failed: {}", candidate, failure);
        ProbeOutcome::new(candidate, ProbeStatus::Failed(failure))
    }
}
