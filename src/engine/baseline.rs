use crate::model::{Baseline, Target};
use crate::probe;
use std::time::Duration;

/// High-entropy name no sane server has a vhost for. Whatever the server
/// answers for it is the phantom response every candidate is compared to.
pub const NON_EXISTING_VHOST: &str = "f00aa3a1775a0626";

/// Probes the sentinel name once and captures the phantom signature.
/// When the probe fails there is nothing to compare against, so the
/// baseline stays absent and every candidate result passes the filter.
pub async fn establish(target: &Target, append: &str, io_timeout: Duration) -> Option<Baseline> {
    let mut vhost = NON_EXISTING_VHOST.to_string();
    if !append.is_empty() {
        vhost.push_str(append);
    }

    match probe::probe(target, &vhost, io_timeout).await {
        Ok(result) => {
            tracing::debug!(
                host = %target.original.host,
                code = %result.code,
                length = %result.length,
                "baseline established"
            );
            Some(Baseline::from(result))
        }
        Err(err) => {
            tracing::warn!(
                host = %target.original.host,
                kind = err.kind(),
                error = %err,
                "baseline probe failed; nothing will be filtered for this target"
            );
            None
        }
    }
}
