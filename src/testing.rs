use std::{
    collections::HashSet,
    future::Future,
    net::IpAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::sync::mpsc;

use crate::{
    error::{Error, Result},
    target::EchoProtocol,
    transport::{resolve_host, Reply, Transport, TransportConfig},
};

/// Deterministic transport: replies for `responders` after `reply_delay`, stays silent for
/// everyone else until `max_wait` has elapsed.
#[derive(Debug, Default)]
pub(crate) struct StubTransport {
    responders: HashSet<IpAddr>,
    failing: HashSet<IpAddr>,
    unresolvable: HashSet<String>,
    stray: Option<IpAddr>,
    duplicate_replies: bool,
    hanging: bool,
    reply_delay: Duration,
    resolutions: Mutex<Vec<(String, EchoProtocol)>>,
    configs: Mutex<Vec<TransportConfig>>,
    liveness: Arc<()>,
}

impl StubTransport {
    pub(crate) fn new() -> Self {
        Self {
            reply_delay: Duration::from_millis(20),
            ..Self::default()
        }
    }

    pub(crate) fn responding(mut self, addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        self.responders.extend(addrs);
        self
    }

    pub(crate) fn failing(mut self, addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        self.failing.extend(addrs);
        self
    }

    pub(crate) fn unresolvable(mut self, host: &str) -> Self {
        self.unresolvable.insert(host.to_owned());
        self
    }

    /// Pushes a reply for `addr` regardless of which targets were registered.
    pub(crate) fn with_stray_reply(mut self, addr: IpAddr) -> Self {
        self.stray = Some(addr);
        self
    }

    pub(crate) fn with_duplicate_replies(mut self) -> Self {
        self.duplicate_replies = true;
        self
    }

    /// Never lets the loop finish.
    pub(crate) fn hanging(mut self) -> Self {
        self.hanging = true;
        self
    }

    /// Every running loop holds a clone of `liveness` until it is dropped.
    pub(crate) fn with_liveness(mut self, liveness: Arc<()>) -> Self {
        self.liveness = liveness;
        self
    }

    pub(crate) fn configs(&self) -> Vec<TransportConfig> {
        self.configs.lock().unwrap().clone()
    }

    pub(crate) fn resolutions(&self) -> Vec<(String, EchoProtocol)> {
        self.resolutions.lock().unwrap().clone()
    }
}

impl Transport for StubTransport {
    fn resolve(
        &self,
        host: &str,
        protocol: EchoProtocol,
    ) -> impl Future<Output = Result<IpAddr>> + Send {
        self.resolutions
            .lock()
            .unwrap()
            .push((host.to_owned(), protocol));
        let unresolvable = self.unresolvable.contains(host);
        async move {
            if unresolvable {
                return Err(Error::Resolve {
                    host: host.to_owned(),
                    reason: "no such host".into(),
                });
            }
            resolve_host(host, protocol).await
        }
    }

    fn probe_loop(
        &self,
        config: TransportConfig,
        targets: Vec<IpAddr>,
        replies: mpsc::UnboundedSender<Reply>,
    ) -> impl Future<Output = Result<()>> + Send {
        self.configs.lock().unwrap().push(config);
        let liveness = Arc::clone(&self.liveness);
        async move {
            let _liveness = liveness;
            if targets.iter().any(|target| self.failing.contains(target)) {
                return Err(Error::Opaque("operation not permitted".into()));
            }
            if let Some(addr) = self.stray {
                let _ = replies.send(Reply {
                    addr,
                    rtt: Duration::ZERO,
                });
            }
            tokio::time::sleep(self.reply_delay).await;
            for &addr in targets.iter().filter(|t| self.responders.contains(*t)) {
                let reply = Reply {
                    addr,
                    rtt: self.reply_delay,
                };
                let _ = replies.send(reply);
                if self.duplicate_replies {
                    let _ = replies.send(reply);
                }
            }
            if self.hanging {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(config.max_wait.saturating_sub(self.reply_delay)).await;
            Ok(())
        }
    }
}
