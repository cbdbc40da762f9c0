use std::{
    future::Future,
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use log::debug;
use socket2::Type;
use surge_ping::{Config, PingIdentifier, PingSequence, SurgeError, ICMP};
use tokio::sync::mpsc;

use crate::{
    constants::ECHO_PAYLOAD_LEN,
    error::{Error, Result},
    target::EchoProtocol,
    transport::{resolve_host, Reply, Transport, TransportConfig, TransportMode},
};

/// ICMP echo transport backed by `surge-ping`.
///
/// Every call to [`Transport::probe_loop`] opens its own sockets, so loops never share state.
#[derive(Copy, Clone, Debug, Default)]
pub struct IcmpTransport;

impl Transport for IcmpTransport {
    fn resolve(
        &self,
        host: &str,
        protocol: EchoProtocol,
    ) -> impl Future<Output = Result<IpAddr>> + Send {
        resolve_host(host, protocol)
    }

    fn probe_loop(
        &self,
        config: TransportConfig,
        targets: Vec<IpAddr>,
        replies: mpsc::UnboundedSender<Reply>,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let v4 = open_client(EchoProtocol::Icmpv4, &config, &targets)?;
            let v6 = open_client(EchoProtocol::Icmpv6, &config, &targets)?;
            let identifier: u16 = rand::random();

            let echoes = targets.iter().map(|&addr| {
                let client = if addr.is_ipv4() { v4.as_ref() } else { v6.as_ref() };
                let replies = &replies;
                async move {
                    let client = client.ok_or_else(|| {
                        Error::Opaque(format!("no echo socket for {}", addr).into())
                    })?;
                    echo(client, addr, identifier, config.max_wait, replies).await
                }
            });
            futures::future::try_join_all(echoes).await?;
            Ok(())
        }
    }
}

fn open_client(
    protocol: EchoProtocol,
    config: &TransportConfig,
    targets: &[IpAddr],
) -> Result<Option<surge_ping::Client>> {
    if !targets.iter().any(|addr| protocol.matches(addr)) {
        return Ok(None);
    }
    let kind = match protocol {
        EchoProtocol::Icmpv4 => ICMP::V4,
        EchoProtocol::Icmpv6 => ICMP::V6,
    };
    let mut builder = Config::builder()
        .kind(kind)
        .sock_type_hint(socket_type(config.mode));
    if let Some(source) = config.source {
        builder = builder.bind(SocketAddr::new(source, 0));
    }
    surge_ping::Client::new(&builder.build())
        .map(Some)
        .map_err(|err| {
            Error::Opaque(format!("failed to open {} socket, reason: {}", protocol, err).into())
        })
}

fn socket_type(mode: TransportMode) -> Type {
    match mode {
        TransportMode::Raw => Type::RAW,
        TransportMode::Datagram => Type::DGRAM,
    }
}

async fn echo(
    client: &surge_ping::Client,
    addr: IpAddr,
    identifier: u16,
    max_wait: Duration,
    replies: &mpsc::UnboundedSender<Reply>,
) -> Result<()> {
    let payload = [0; ECHO_PAYLOAD_LEN];
    let mut pinger = client.pinger(addr, PingIdentifier(identifier)).await;
    pinger.timeout(max_wait);
    match pinger.ping(PingSequence(0), &payload).await {
        Ok((_, rtt)) => {
            let _ = replies.send(Reply { addr, rtt });
            Ok(())
        }
        Err(SurgeError::Timeout { .. }) => {
            debug!("no echo reply from {} within {:?}", addr, max_wait);
            Ok(())
        }
        Err(err) => Err(Error::Opaque(
            format!("echo to {} failed, reason: {}", addr, err).into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::{IpAddr, Ipv4Addr},
        time::Duration,
    };

    use socket2::Type;

    use super::{open_client, socket_type};
    use crate::{
        target::EchoProtocol,
        transport::{TransportConfig, TransportMode},
    };

    #[test]
    fn test_socket_type_follows_mode() {
        assert_eq!(socket_type(TransportMode::Raw), Type::RAW);
        assert_eq!(socket_type(TransportMode::Datagram), Type::DGRAM);
    }

    #[test]
    fn test_no_socket_without_matching_targets() {
        let config = TransportConfig {
            max_wait: Duration::from_secs(1),
            mode: TransportMode::Datagram,
            source: None,
        };
        let targets = [IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))];
        assert!(open_client(EchoProtocol::Icmpv6, &config, &targets)
            .unwrap()
            .is_none());
    }
}
