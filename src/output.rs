use crate::model::{OutputConfig, OutputFormat, ProbeResult};
use std::io::{BufWriter, Write};
use tokio::sync::mpsc;

/// Single consumer for every accepted result across all targets. Workers
/// clone the channel and `emit`; one blocking task drains the queue and
/// writes to stdout (or an injected writer). `shutdown` closes the queue
/// and joins the writer, so
/// nothing is left buffered when the run ends.
#[derive(Clone)]
pub struct OutputChannel {
    inner: std::sync::Arc<OutputInner>,
}

struct OutputInner {
    tx: tokio::sync::Mutex<Option<mpsc::Sender<ProbeResult>>>,
    handle: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl OutputChannel {
    pub fn new(cfg: OutputConfig) -> Self {
        Self::with_writer(cfg, std::io::stdout())
    }

    /// Same channel, custom destination. Tests hand in an in-memory
    /// writer to observe exactly what the workers emitted.
    pub fn with_writer<W>(cfg: OutputConfig, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1024);
        let handle = tokio::task::spawn_blocking(move || run_writer(cfg, writer, rx));

        Self {
            inner: std::sync::Arc::new(OutputInner {
                tx: tokio::sync::Mutex::new(Some(tx)),
                handle: tokio::sync::Mutex::new(Some(handle)),
            }),
        }
    }

    pub async fn emit(&self, result: ProbeResult) -> anyhow::Result<()> {
        let guard = self.inner.tx.lock().await;
        if let Some(tx) = guard.as_ref() {
            tx.send(result)
                .await
                .map_err(|err| anyhow::anyhow!("output worker not available: {err}"))?;
        } else {
            anyhow::bail!("output worker not available; dropping result");
        }
        Ok(())
    }

    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.inner.tx.lock().await.take();

        if let Some(handle) = self.inner.handle.lock().await.take() {
            handle
                .await
                .map_err(|err| anyhow::anyhow!("failed to join output worker: {err}"))?;
        }

        Ok(())
    }
}

fn run_writer<W: Write>(cfg: OutputConfig, writer: W, mut rx: mpsc::Receiver<ProbeResult>) {
    let mut writer = BufWriter::new(writer);

    while let Some(result) = rx.blocking_recv() {
        match format_line(cfg.format, &result) {
            Ok(line) => {
                if writeln!(writer, "{line}").and_then(|_| writer.flush()).is_err() {
                    break;
                }
            }
            Err(err) => eprintln!("failed to serialize result: {err}"),
        }
    }

    let _ = writer.flush();
}

fn format_line(format: OutputFormat, result: &ProbeResult) -> anyhow::Result<String> {
    match format {
        OutputFormat::Lines => Ok(format!(
            "{};{};{};{};{}",
            result.vhost, result.code, result.status, result.length, result.location
        )),
        OutputFormat::Jsonl => Ok(serde_json::to_string(result)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProbeResult {
        ProbeResult {
            vhost: "www".into(),
            code: "200".into(),
            status: "OK".into(),
            length: "120".into(),
            location: "".into(),
        }
    }

    #[test]
    fn lines_format_joins_the_five_fields() {
        let line = format_line(OutputFormat::Lines, &sample()).unwrap();
        assert_eq!(line, "www;200;OK;120;");
    }

    #[test]
    fn jsonl_format_round_trips() {
        let line = format_line(OutputFormat::Jsonl, &sample()).unwrap();
        let back: ProbeResult = serde_json::from_str(&line).unwrap();
        assert_eq!(back, sample());
    }

    #[derive(Clone, Default)]
    struct CaptureWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn emitted_results_reach_the_writer() {
        let capture = CaptureWriter::default();
        let channel = OutputChannel::with_writer(
            OutputConfig {
                format: OutputFormat::Lines,
            },
            capture.clone(),
        );
        channel.emit(sample()).await.unwrap();
        channel.shutdown().await.unwrap();

        let written = capture.0.lock().unwrap();
        assert_eq!(String::from_utf8_lossy(&written), "www;200;OK;120;\n");
    }

    #[tokio::test]
    async fn emit_after_shutdown_fails() {
        let channel = OutputChannel::new(OutputConfig {
            format: OutputFormat::Lines,
        });
        channel.shutdown().await.unwrap();
        assert!(channel.emit(sample()).await.is_err());
    }
}
