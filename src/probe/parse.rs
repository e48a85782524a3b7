use crate::error::ProbeError;
use crate::model::ProbeResult;

/// Parses a raw (possibly truncated) HTTP response into a [`ProbeResult`].
///
/// The parser is deliberately loose: it only needs the status line plus the
/// handful of headers the baseline comparison looks at, and the input may be
/// cut off mid-header because the probe reads a bounded number of bytes.
/// Lines without a colon are skipped, header keys are case-insensitive, and
/// for duplicate headers the last occurrence wins. A `Location` header only
/// replaces an earlier `Content-Location` on a 302 response.
pub fn parse(vhost: &str, raw: &[u8]) -> Result<ProbeResult, ProbeError> {
    let text = String::from_utf8_lossy(raw);
    let mut lines = text.split('\n').map(str::trim);

    let first = lines.next().unwrap_or("");
    let mut parts = first.splitn(3, ' ');
    let (version, code, status) = match (parts.next(), parts.next(), parts.next()) {
        (Some(version), Some(code), Some(status)) => (version, code, status),
        _ => {
            return Err(ProbeError::malformed(format!(
                "unparseable status line: {first:?}"
            )))
        }
    };
    if !version.starts_with("HTTP") {
        return Err(ProbeError::malformed(format!(
            "status line does not start with HTTP: {first:?}"
        )));
    }

    let mut length = String::from("0");
    let mut location = String::new();

    for line in lines {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if key.eq_ignore_ascii_case("content-length") {
            let parsed: u64 = value.parse().map_err(|_| {
                ProbeError::malformed(format!("non-numeric content-length: {value:?}"))
            })?;
            length = parsed.to_string();
        } else if key.eq_ignore_ascii_case("content-location") {
            location = value.to_string();
        } else if key.eq_ignore_ascii_case("location") && (location.is_empty() || code == "302") {
            location = value.to_string();
        }
    }

    Ok(ProbeResult {
        vhost: vhost.to_string(),
        code: code.to_string(),
        status: status.to_string(),
        length,
        location,
    })
}
