use clap::Parser;
use tracing_subscriber::EnvFilter;
use vhostgrab::cli::Cli;
use vhostgrab::engine::Engine;
use vhostgrab::output::OutputChannel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = cli.into_config()?;

    let sink = OutputChannel::new(cfg.output.clone());
    let mut engine = Engine::new(cfg, sink);
    let summary = engine.run().await?;

    tracing::info!(
        seconds = summary.elapsed.as_secs(),
        requests = summary.requests,
        per_second = summary.per_second(),
        "done"
    );

    Ok(())
}
