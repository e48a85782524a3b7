mod parse;
mod tls;

pub use parse::parse;

use crate::error::ProbeError;
use crate::model::{ProbeResult, Target};
use std::pin::Pin;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_openssl::SslStream;

/// Upper bound on how much of a response a single probe reads. One read
/// call, no draining loop; responses past this point are truncated on
/// purpose to keep the per-candidate cost flat.
pub const MAX_RESPONSE_BYTES: usize = 512;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.2; WOW64; rv:19.0) Gecko/20100101 Firefox/19.0";

/// Sends one `GET /` request for `vhost` to the target and parses whatever
/// comes back. Every probe opens a fresh connection; there is no pooling
/// and no retry. Each blocking step (connect, handshake, send, read) runs
/// under the same `io_timeout`.
pub async fn probe(
    target: &Target,
    vhost: &str,
    io_timeout: Duration,
) -> Result<ProbeResult, ProbeError> {
    let stream = match timeout(io_timeout, TcpStream::connect(target.resolved)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(err)) => return Err(ProbeError::Connect(err)),
        Err(_) => return Err(ProbeError::ConnectTimeout),
    };

    let request = build_request(vhost);

    let raw = if target.original.tls {
        let mut tls_stream = handshake(stream, vhost, io_timeout).await?;
        let raw = exchange(&mut tls_stream, request.as_bytes(), io_timeout).await;
        let _ = Pin::new(&mut tls_stream).shutdown().await;
        raw?
    } else {
        let mut stream = stream;
        let raw = exchange(&mut stream, request.as_bytes(), io_timeout).await;
        let _ = stream.shutdown().await;
        raw?
    };

    parse(vhost, &raw)
}

fn build_request(vhost: &str) -> String {
    format!("GET / HTTP/1.1\r\nHost: {vhost}\r\nUser-Agent: {USER_AGENT}\r\n\r\n")
}

async fn handshake(
    stream: TcpStream,
    vhost: &str,
    io_timeout: Duration,
) -> Result<SslStream<TcpStream>, ProbeError> {
    let connector = tls::connector().map_err(|err| ProbeError::Tls(err.to_string()))?;
    let ssl = connector
        .configure()
        .and_then(|config| config.into_ssl(vhost))
        .map_err(|err| ProbeError::Tls(err.to_string()))?;
    let mut tls_stream =
        SslStream::new(ssl, stream).map_err(|err| ProbeError::Tls(err.to_string()))?;
    match timeout(io_timeout, Pin::new(&mut tls_stream).connect()).await {
        Ok(Ok(())) => Ok(tls_stream),
        Ok(Err(err)) => Err(ProbeError::Tls(err.to_string())),
        Err(_) => Err(ProbeError::Timeout),
    }
}

/// Write the request, then perform exactly one bounded read.
async fn exchange<S>(
    stream: &mut S,
    request: &[u8],
    io_timeout: Duration,
) -> Result<Vec<u8>, ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match timeout(io_timeout, stream.write_all(request)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => return Err(ProbeError::Send(err)),
        Err(_) => return Err(ProbeError::Timeout),
    }

    let mut buf = vec![0u8; MAX_RESPONSE_BYTES];
    let n = match timeout(io_timeout, stream.read(&mut buf)).await {
        Ok(Ok(n)) => n,
        Ok(Err(err)) => return Err(ProbeError::Receive(err)),
        Err(_) => return Err(ProbeError::Timeout),
    };
    buf.truncate(n);
    Ok(buf)
}
