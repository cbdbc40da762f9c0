use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `token` on Ctrl-C (and SIGTERM on unix).
///
/// A single listener serves every probe sharing the token. The task exits quietly if the
/// token is cancelled by someone else first.
pub fn listen_for_shutdown(token: CancellationToken) -> JoinHandle<()> {
    tokio::task::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
            },
            signal = wait_for_signal() => {
                info!("received {}, stopping probes", signal);
                token.cancel();
            }
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = interrupt() => "interrupt",
                _ = terminate.recv() => "terminate",
            }
        }
        Err(err) => {
            warn!("failed to listen for SIGTERM, reason: {}", err);
            interrupt().await;
            "interrupt"
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    interrupt().await;
    "interrupt"
}

async fn interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for interrupt, reason: {}", err);
        std::future::pending::<()>().await;
    }
}
