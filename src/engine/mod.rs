pub mod baseline;

use crate::model::{Baseline, Config, Summary, Target};
use crate::output::OutputChannel;
use crate::probe;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, instrument, trace};

pub struct Engine {
    cfg: Arc<Config>,
    sink: OutputChannel,
}

impl Engine {
    pub fn new(cfg: Config, sink: OutputChannel) -> Self {
        Self {
            cfg: Arc::new(cfg),
            sink,
        }
    }

    /// Runs the enumeration: one worker pool per resolved target, all
    /// pools feeding the shared output channel. Returns once every pool
    /// has drained its queue and the output channel has been flushed.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> anyhow::Result<Summary> {
        let words = Arc::new(crate::input::load_wordlist(&self.cfg.wordlist).await?);
        info!(words = words.len(), "wordlist loaded");

        let start = Instant::now();
        let mut targets = crate::input::stream_targets(&self.cfg);
        let mut pools = FuturesUnordered::new();
        let mut target_count = 0usize;

        while let Some(target) = targets.next().await {
            target_count += 1;
            let cfg = self.cfg.clone();
            let words = words.clone();
            let sink = self.sink.clone();
            pools.push(tokio::spawn(run_pool(target, words, cfg, sink)));
        }

        while let Some(joined) = pools.next().await {
            joined?;
        }
        self.sink.shutdown().await?;

        Ok(Summary {
            targets: target_count,
            requests: words.len() * target_count,
            elapsed: start.elapsed(),
        })
    }
}

/// One target's pool: establish the baseline first, pre-fill the work
/// queue, then let `threads` workers drain it. The baseline is computed
/// exactly once and shared read-only, so no worker ever classifies
/// against a half-established value.
async fn run_pool(
    target: Target,
    words: Arc<Vec<String>>,
    cfg: Arc<Config>,
    sink: OutputChannel,
) {
    let baseline = baseline::establish(&target, &cfg.append, cfg.timeout).await;
    let baseline = Arc::new(baseline);

    let (tx, rx) = mpsc::channel(words.len().max(1));
    for word in words.iter() {
        if tx.send(word.clone()).await.is_err() {
            break;
        }
    }
    drop(tx);
    let queue = Arc::new(Mutex::new(rx));

    let mut workers = FuturesUnordered::new();
    for _ in 0..cfg.threads.max(1) {
        workers.push(tokio::spawn(worker(
            target.clone(),
            baseline.clone(),
            queue.clone(),
            cfg.clone(),
            sink.clone(),
        )));
    }

    while let Some(joined) = workers.next().await {
        if let Err(err) = joined {
            tracing::error!(host = %target.original.host, error = %err, "worker panicked");
        }
    }
    debug!(host = %target.original.host, "target drained");
}

/// Worker loop: dequeue, append the suffix, probe, classify, emit.
/// Probe failures are logged with their kind and otherwise dropped; a
/// candidate is never retried.
async fn worker(
    target: Target,
    baseline: Arc<Option<Baseline>>,
    queue: Arc<Mutex<mpsc::Receiver<String>>>,
    cfg: Arc<Config>,
    sink: OutputChannel,
) {
    loop {
        let word = { queue.lock().await.recv().await };
        let Some(word) = word else { break };

        let vhost = if cfg.append.is_empty() {
            word
        } else {
            format!("{word}{}", cfg.append)
        };

        match probe::probe(&target, &vhost, cfg.timeout).await {
            Ok(result) => {
                if let Some(baseline) = baseline.as_ref() {
                    if baseline.matches(&result) {
                        trace!(vhost = %vhost, "matches phantom baseline, skipping");
                        continue;
                    }
                }
                if let Err(err) = sink.emit(result).await {
                    tracing::error!(vhost = %vhost, error = %err, "failed to emit result");
                }
            }
            Err(err) => {
                debug!(vhost = %vhost, kind = err.kind(), error = %err, "probe failed");
            }
        }
    }
}
