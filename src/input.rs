use crate::model::{Config, Target, TargetSpec};
use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{lookup_host, TcpStream};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Parses one command-line target string into a spec.
///
/// Accepted shapes: `host`, `host:port`, `http://host[:port]`,
/// `https://host[:port]`. The scheme picks the default port (80/443) and
/// whether the probes wrap the connection in TLS.
pub fn parse_target(entry: &str) -> anyhow::Result<TargetSpec> {
    let (tls, rest) = match entry.split_once("://") {
        Some((scheme, rest)) => match scheme.to_ascii_lowercase().as_str() {
            "http" => (false, rest),
            "https" => (true, rest),
            other => anyhow::bail!("unsupported scheme {other:?} in target {entry:?}"),
        },
        None => (false, entry),
    };

    let rest = rest.trim().to_ascii_lowercase();
    let default_port = if tls { 443 } else { 80 };
    let parse_port = |text: &str| -> anyhow::Result<u16> {
        text.parse()
            .with_context(|| format!("invalid port in target {entry:?}"))
    };

    let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
        // [v6-literal] with optional :port
        let (host, after) = bracketed
            .split_once(']')
            .with_context(|| format!("unclosed bracket in target {entry:?}"))?;
        match after.strip_prefix(':') {
            Some(port_part) => (host, parse_port(port_part)?),
            None => (host, default_port),
        }
    } else {
        match rest.rsplit_once(':') {
            // Two or more colons without brackets: a bare IPv6 literal.
            Some((host_part, _)) if host_part.contains(':') => (rest.as_str(), default_port),
            Some((host_part, port_part)) => (host_part, parse_port(port_part)?),
            None => (rest.as_str(), default_port),
        }
    };

    anyhow::ensure!(!host.is_empty(), "empty host in target {entry:?}");
    anyhow::ensure!(port != 0, "invalid port 0 in target {entry:?}");

    Ok(TargetSpec {
        host: host.to_string(),
        port,
        tls,
    })
}

/// Resolves every configured target spec and streams the live ones.
/// Resolution failures drop the target with an error log; a failed
/// connect pre-check is only warned about, the target still runs.
pub fn stream_targets(cfg: &Config) -> ReceiverStream<Target> {
    let (tx, rx) = mpsc::channel(16);
    let specs = cfg.targets.clone();
    let timeout = cfg.timeout;

    tokio::spawn(async move {
        for spec in specs {
            match resolve(&spec).await {
                Ok(resolved) => {
                    let target = Target {
                        original: spec,
                        resolved,
                    };
                    check_alive(&target, timeout).await;
                    if tx.send(target).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::error!(host = %spec.host, error = %err, "could not resolve target");
                }
            }
        }
    });

    ReceiverStream::new(rx)
}

async fn resolve(spec: &TargetSpec) -> anyhow::Result<SocketAddr> {
    let mut lookup = lookup_host((spec.host.as_str(), spec.port))
        .await
        .with_context(|| format!("lookup failed for {}", spec.host))?;
    lookup
        .next()
        .with_context(|| format!("no addresses for {}", spec.host))
}

async fn check_alive(target: &Target, io_timeout: Duration) {
    match tokio::time::timeout(io_timeout, TcpStream::connect(target.resolved)).await {
        Ok(Ok(_)) => {
            tracing::info!(host = %target.original.host, addr = %target.resolved, "target alive");
        }
        Ok(Err(err)) => {
            tracing::warn!(host = %target.original.host, error = %err, "connect check failed");
        }
        Err(_) => {
            tracing::warn!(host = %target.original.host, "connect check timed out");
        }
    }
}

/// Loads the wordlist: one candidate name per line, blank lines skipped.
pub async fn load_wordlist(path: &str) -> anyhow::Result<Vec<String>> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("cannot open wordlist {path}"))?;
    let mut lines = BufReader::new(file).lines();
    let mut words = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        words.push(trimmed.to_string());
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bare_host_defaults_to_port_80() {
        let spec = parse_target("www.example.com").unwrap();
        assert_eq!(spec.port, 80);
        assert!(!spec.tls);
    }

    #[test]
    fn https_scheme_sets_tls_and_port_443() {
        let spec = parse_target("https://www.example.com").unwrap();
        assert_eq!(spec.port, 443);
        assert!(spec.tls);
    }

    #[test]
    fn explicit_port_overrides_scheme_default() {
        let spec = parse_target("https://www.example.com:4433").unwrap();
        assert_eq!(spec.port, 4433);
        assert!(spec.tls);
    }

    #[test]
    fn hosts_are_lowercased() {
        let spec = parse_target("HTTP://WWW.Example.COM:8080").unwrap();
        assert_eq!(spec.host, "www.example.com");
        assert_eq!(spec.port, 8080);
    }

    #[test]
    fn bracketed_ipv6_with_port() {
        let spec = parse_target("[::1]:8443").unwrap();
        assert_eq!(spec.host, "::1");
        assert_eq!(spec.port, 8443);
    }

    #[test]
    fn ipv6_without_port_uses_the_scheme_default() {
        assert_eq!(parse_target("[::1]").unwrap().port, 80);
        assert_eq!(parse_target("https://[::1]").unwrap().port, 443);
        assert_eq!(parse_target("::1").unwrap().host, "::1");
    }

    #[test]
    fn rejects_bad_specs() {
        assert!(parse_target("ftp://example.com").is_err());
        assert!(parse_target("example.com:0").is_err());
        assert!(parse_target("example.com:notaport").is_err());
        assert!(parse_target("http://").is_err());
    }

    #[tokio::test]
    async fn wordlist_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "www\n\n  \nmail\nftp  ").unwrap();
        let words = load_wordlist(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(words, vec!["www", "mail", "ftp"]);
    }

    #[tokio::test]
    async fn wordlist_missing_file_is_an_error() {
        assert!(load_wordlist("/nonexistent/words.txt").await.is_err());
    }
}
