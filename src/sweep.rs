use std::sync::Arc;

use log::{debug, warn};
use tokio::{sync::mpsc, task::JoinSet};

use crate::{
    client::Client,
    error::{Error, Result},
    icmp::IcmpTransport,
    probe::{ProbeInput, ProbeOutcome, ProbeStatus},
    transport::Transport,
};

/// Fans probes out over a whole candidate list and collects the reachable ones.
///
/// # Example
/// ```no_run
/// use async_icmp_sweep::{target, Client, ClientConfigBuilder, IcmpTransport, Sweeper, TransportMode};
/// use tokio_util::sync::CancellationToken;
///
/// tokio_test::block_on(async {
///     let config = ClientConfigBuilder::new()
///         .with_mode(TransportMode::Datagram)
///         .build();
///     let sweeper = Sweeper::new(Client::new(IcmpTransport, config, CancellationToken::new()));
///     let inputs = target::probe_inputs("192.168.10.", None).unwrap();
///     for (index, outcome) in sweeper.sweep(inputs).await.unwrap().iter().enumerate() {
///         println!("{} : {}", index + 1, outcome.candidate);
///     }
/// })
/// ```
#[derive(Debug)]
pub struct Sweeper<T: Transport = IcmpTransport> {
    client: Arc<Client<T>>,
}

impl<T: Transport> Sweeper<T> {
    pub fn new(client: Client<T>) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Probes every input concurrently and returns the reachable outcomes in the order
    /// they were received.
    ///
    /// Collection ends once every probe has reported, once no probe is left to report, or
    /// once the per-candidate bound plus the configured margin has elapsed, whichever is
    /// first.
    ///
    /// Probes still running when collection ends are aborted along with their transports.
    ///
    /// # Errors
    /// Returns [`Error::Interrupted`] when the client's token is cancelled mid-sweep, and
    /// [`Error::AllFailed`] when every reported probe failed to resolve or to transmit.
    pub async fn sweep(&self, inputs: Vec<ProbeInput>) -> Result<Vec<ProbeOutcome>> {
        let expected = inputs.len();
        let (tx, mut rx) = mpsc::channel(1);
        let mut probes = JoinSet::new();
        for input in inputs {
            let client = Arc::clone(&self.client);
            let tx = tx.clone();
            probes.spawn(async move {
                match client.probe(input).await {
                    Ok(outcome) => {
                        let _ = tx.send(outcome).await;
                    }
                    Err(err) => debug!("probe abandoned: {}", err),
                }
            });
        }
        drop(tx);

        let config = self.client.config();
        let deadline = tokio::time::sleep(
            config.resolve_timeout + config.max_wait + config.collect_margin,
        );
        tokio::pin!(deadline);

        let token = self.client.token();
        let mut reachable = Vec::new();
        let mut received = 0;
        let mut failed = 0;
        let mut last_failure = None;
        while received < expected {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(Error::Interrupted),
                outcome = rx.recv() => match outcome {
                    Some(outcome) => {
                        received += 1;
                        match &outcome.status {
                            ProbeStatus::Reachable(_) => reachable.push(outcome),
                            ProbeStatus::Failed(failure) => {
                                failed += 1;
                                last_failure = Some(failure.clone());
                            }
                            ProbeStatus::Unreachable => {}
                        }
                    }
                    None => break,
                },
                _ = &mut deadline => break,
            }
        }
        if received < expected {
            warn!(
                "{} of {} candidates did not report, treating them as unreachable",
                expected - received,
                expected
            );
        }
        probes.abort_all();
        match last_failure {
            Some(last) if failed == received => Err(Error::AllFailed {
                count: failed,
                last,
            }),
            _ => Ok(reachable),
        }
    }
}
