use std::{
    io::Write,
    net::IpAddr,
    process::ExitCode,
};

use async_icmp_sweep::{
    error::{Error, Result},
    shutdown, target, Client, ClientConfigBuilder, IcmpTransport, Sweeper, TransportMode,
};
use clap::Parser;
use log::error;
use tokio_util::sync::CancellationToken;

/// Lists the hosts of a /24-style range that answer ICMP echo requests
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Use non-privileged datagram-oriented sockets as ICMP endpoints
    #[arg(short, long)]
    udp: bool,
    /// Base hostname or prefix the suffixes 1-254 are appended to, e.g. 192.168.10.
    base: String,
    /// Source address for outgoing echo requests
    source: Option<IpAddr>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Interrupted) => {
            error!("interrupted, no results");
            ExitCode::from(130)
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let inputs = target::probe_inputs(&args.base, args.source)?;
    let mode = if args.udp {
        TransportMode::Datagram
    } else {
        TransportMode::Raw
    };

    let token = CancellationToken::new();
    let _listener = shutdown::listen_for_shutdown(token.clone());
    let client = Client::new(
        IcmpTransport,
        ClientConfigBuilder::new().with_mode(mode).build(),
        token,
    );
    let reachable = Sweeper::new(client).sweep(inputs).await?;

    let mut stdout = std::io::stdout().lock();
    for (index, outcome) in reachable.iter().enumerate() {
        writeln!(stdout, "{} : {}", index + 1, outcome.candidate)
            .map_err(|err| Error::Opaque(err.into()))?;
    }
    Ok(())
}
