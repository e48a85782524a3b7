use anyhow::anyhow;
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use std::sync::OnceLock;

/// Shared TLS connector for all probes. We only need to complete the
/// handshake to exchange one request, so certificate and hostname
/// verification are disabled.
pub(super) fn connector() -> anyhow::Result<&'static SslConnector> {
    static CONNECTOR: OnceLock<anyhow::Result<SslConnector>> = OnceLock::new();

    CONNECTOR
        .get_or_init(|| {
            let mut builder = SslConnector::builder(SslMethod::tls()).map_err(|e| anyhow!(e))?;
            builder.set_verify(SslVerifyMode::NONE);
            Ok(builder.build())
        })
        .as_ref()
        .map_err(|err| anyhow!("failed to create TLS connector: {err}"))
}
