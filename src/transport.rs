//! The contract between the probe supervisor and whatever actually sends echo requests.

use std::{future::Future, net::IpAddr, sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{Error, Result},
    target::EchoProtocol,
};

/// How echo requests leave the host.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum TransportMode {
    /// Raw ICMP socket, usually requires elevated privileges.
    #[default]
    Raw,
    /// Unprivileged datagram-oriented ICMP socket.
    Datagram,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TransportConfig {
    /// Bound on how long a single target may take to reply.
    pub max_wait: Duration,
    pub mode: TransportMode,
    pub source: Option<IpAddr>,
}

/// A reply matched to one of the registered targets.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Reply {
    pub addr: IpAddr,
    pub rtt: Duration,
}

/// An echo transport.
///
/// Implementations must honour `max_wait`, finish the loop exactly once, and never push a
/// reply for an address outside `targets`.
pub trait Transport: Send + Sync + 'static {
    /// Resolves `host` to an address of the family selected by `protocol`.
    fn resolve(
        &self,
        host: &str,
        protocol: EchoProtocol,
    ) -> impl Future<Output = Result<IpAddr>> + Send;

    /// Probes every target once, pushing matching replies into `replies`.
    ///
    /// Completes with `Ok(())` once the wait bound has elapsed for all targets, or with an
    /// error when the transport itself fails.
    fn probe_loop(
        &self,
        config: TransportConfig,
        targets: Vec<IpAddr>,
        replies: mpsc::UnboundedSender<Reply>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// A running probe loop owned by a single supervisor.
///
/// The loop is cancelled on [`TransportHandle::stop`] or when the handle is dropped.
#[derive(Debug)]
pub struct TransportHandle {
    pub(crate) replies: mpsc::UnboundedReceiver<Reply>,
    pub(crate) finished: oneshot::Receiver<Result<()>>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl TransportHandle {
    pub fn start<T: Transport>(
        transport: Arc<T>,
        config: TransportConfig,
        targets: Vec<IpAddr>,
    ) -> Self {
        let (reply_tx, replies) = mpsc::unbounded_channel();
        let (finished_tx, finished) = oneshot::channel();
        let token = CancellationToken::new();
        let loop_token = token.clone();
        let handle = tokio::task::spawn(async move {
            tokio::select! {
                result = transport.probe_loop(config, targets, reply_tx) => {
                    let _ = finished_tx.send(result);
                },
                _ = loop_token.cancelled() => {
                }
            }
        });
        Self {
            replies,
            finished,
            token,
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.token.cancel();
        self.handle = None;
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.token.cancel();
        }
    }
}

/// Resolves `host` as an IP literal first, then through the system resolver.
pub async fn resolve_host(host: &str, protocol: EchoProtocol) -> Result<IpAddr> {
    let resolve_error = |reason: String| Error::Resolve {
        host: host.to_owned(),
        reason,
    };
    if let Ok(addr) = host.parse::<IpAddr>() {
        return if protocol.matches(&addr) {
            Ok(addr)
        } else {
            Err(resolve_error(format!("not usable with {}", protocol)))
        };
    }
    tokio::net::lookup_host((host, 0))
        .await
        .map_err(|err| resolve_error(err.to_string()))?
        .map(|socket_addr| socket_addr.ip())
        .find(|addr| protocol.matches(addr))
        .ok_or_else(|| resolve_error(format!("no address usable with {}", protocol)))
}
