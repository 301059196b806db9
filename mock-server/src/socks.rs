//! Minimal SOCKS5 relay (RFC 1928): no-auth method, CONNECT only.
//!
//! Every CONNECT target is appended to a `ConnectLog` before the upstream
//! connection is attempted, so tests can see what the client asked the proxy
//! to reach.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, Mutex};

use tokio::io::{copy_bidirectional, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

const VERSION: u8 = 0x05;
const METHOD_NO_AUTH: u8 = 0x00;
const METHOD_NONE_ACCEPTABLE: u8 = 0xFF;
const CMD_CONNECT: u8 = 0x01;
const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;

const REPLY_SUCCEEDED: u8 = 0x00;
const REPLY_CONNECTION_REFUSED: u8 = 0x05;
const REPLY_COMMAND_NOT_SUPPORTED: u8 = 0x07;
const REPLY_ADDRESS_NOT_SUPPORTED: u8 = 0x08;

/// `host:port` targets requested through the relay, in arrival order.
#[derive(Clone, Debug, Default)]
pub struct ConnectLog(Arc<Mutex<Vec<String>>>);

impl ConnectLog {
    pub fn targets(&self) -> Vec<String> {
        self.0.lock().map(|t| t.clone()).unwrap_or_default()
    }

    fn record(&self, target: String) {
        if let Ok(mut targets) = self.0.lock() {
            targets.push(target);
        }
    }
}

/// Accept SOCKS5 clients forever, relaying each on its own task.
pub async fn run_socks5(listener: TcpListener, log: ConnectLog) -> io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let log = log.clone();
        tokio::spawn(async move {
            if let Err(e) = relay(stream, log).await {
                debug!(%peer, error = %e, "socks session ended with error");
            }
        });
    }
}

async fn relay(mut client: TcpStream, log: ConnectLog) -> io::Result<()> {
    negotiate_method(&mut client).await?;

    let mut head = [0u8; 4];
    client.read_exact(&mut head).await?;
    if head[0] != VERSION {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "not a SOCKS5 request"));
    }

    let host = match head[3] {
        ATYP_IPV4 => {
            let mut octets = [0u8; 4];
            client.read_exact(&mut octets).await?;
            Ipv4Addr::from(octets).to_string()
        }
        ATYP_DOMAIN => {
            let len = client.read_u8().await? as usize;
            let mut name = vec![0u8; len];
            client.read_exact(&mut name).await?;
            String::from_utf8(name)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "domain is not UTF-8"))?
        }
        ATYP_IPV6 => {
            let mut octets = [0u8; 16];
            client.read_exact(&mut octets).await?;
            Ipv6Addr::from(octets).to_string()
        }
        _ => {
            reply(&mut client, REPLY_ADDRESS_NOT_SUPPORTED).await?;
            return Err(io::Error::new(io::ErrorKind::InvalidData, "unknown address type"));
        }
    };
    let port = client.read_u16().await?;

    if head[1] != CMD_CONNECT {
        reply(&mut client, REPLY_COMMAND_NOT_SUPPORTED).await?;
        return Err(io::Error::new(io::ErrorKind::Unsupported, "only CONNECT is supported"));
    }

    log.record(format!("{host}:{port}"));
    debug!(%host, port, "socks connect");

    let mut upstream = match TcpStream::connect((host.as_str(), port)).await {
        Ok(s) => s,
        Err(e) => {
            reply(&mut client, REPLY_CONNECTION_REFUSED).await?;
            return Err(e);
        }
    };
    reply(&mut client, REPLY_SUCCEEDED).await?;

    copy_bidirectional(&mut client, &mut upstream).await?;
    Ok(())
}

async fn negotiate_method(client: &mut TcpStream) -> io::Result<()> {
    let mut greeting = [0u8; 2];
    client.read_exact(&mut greeting).await?;
    if greeting[0] != VERSION {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "not a SOCKS5 greeting"));
    }
    let mut methods = vec![0u8; greeting[1] as usize];
    client.read_exact(&mut methods).await?;

    if !methods.contains(&METHOD_NO_AUTH) {
        client.write_all(&[VERSION, METHOD_NONE_ACCEPTABLE]).await?;
        return Err(io::Error::new(io::ErrorKind::PermissionDenied, "client requires authentication"));
    }
    client.write_all(&[VERSION, METHOD_NO_AUTH]).await
}

/// Reply with an all-zero IPv4 bound address.
async fn reply(client: &mut TcpStream, code: u8) -> io::Result<()> {
    client
        .write_all(&[VERSION, code, 0x00, ATYP_IPV4, 0, 0, 0, 0, 0, 0])
        .await
}
