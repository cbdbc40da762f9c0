//! Concurrent ICMP echo sweeps over /24-style address ranges.
//!
//! A base such as `192.168.10.` is expanded into candidates `192.168.10.1` through
//! `192.168.10.254`, every candidate gets its own supervised probe, and the reachable ones are
//! collected in the order their replies arrive.
//!
//! ## Example
//! ```no_run
//! use async_icmp_sweep::{shutdown, target, Client, ClientConfigBuilder, IcmpTransport, Sweeper};
//! use tokio_util::sync::CancellationToken;
//!
//! tokio_test::block_on(async {
//!     let token = CancellationToken::new();
//!     shutdown::listen_for_shutdown(token.clone());
//!
//!     let client = Client::new(IcmpTransport, ClientConfigBuilder::new().build(), token);
//!     let inputs = target::probe_inputs("192.168.10.", None).unwrap();
//!     let reachable = Sweeper::new(client).sweep(inputs).await.unwrap();
//!     println!("{} hosts answered", reachable.len());
//! })
//! ```
//! Probing with a custom transport works the same way through [`transport::Transport`].

pub mod client;
pub mod error;
pub mod icmp;
pub mod probe;
pub mod shutdown;
pub mod sweep;
pub mod target;
pub mod transport;

pub(crate) mod constants;
pub(crate) mod pending;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Client, ClientConfig, ClientConfigBuilder};
pub use icmp::IcmpTransport;
pub use probe::{ProbeFailure, ProbeInput, ProbeInputBuilder, ProbeOutcome, ProbeStatus};
pub use sweep::Sweeper;
pub use target::{Candidate, EchoProtocol};
pub use transport::{Reply, Transport, TransportConfig, TransportHandle, TransportMode};
