use crate::model::{Config, OutputConfig, OutputFormat};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about = "Multi-threaded vhost enumeration tool", long_about = None)]
pub struct Cli {
    /// Target hosts, e.g. "www.example.com", "https://www.example.com"
    /// or "https://www.example.com:4433"
    #[arg(value_name = "HOST", required = true)]
    pub hosts: Vec<String>,

    /// Vhost resolver workers per host
    #[arg(long = "threads", default_value_t = 8)]
    pub threads: usize,

    /// Socket timeout in seconds
    #[arg(long = "timeout", default_value_t = 5)]
    pub timeout: u64,

    /// String appended to every vhost candidate (e.g. ".example.com")
    #[arg(long = "append", default_value = "", value_name = ".example.com")]
    pub append: String,

    /// Vhost wordlist, one candidate per line
    #[arg(long = "wordlist", default_value = "dns-big.txt", value_name = "FILE")]
    pub wordlist: String,

    /// Output format
    #[arg(long = "output", default_value_t = OutputFormat::Lines)]
    pub output: OutputFormat,
}

impl Cli {
    pub fn into_config(self) -> anyhow::Result<Config> {
        if self.threads == 0 {
            anyhow::bail!("threads must be greater than zero");
        }

        if self.timeout == 0 {
            anyhow::bail!("timeout must be greater than zero");
        }

        let targets = self
            .hosts
            .iter()
            .map(|entry| crate::input::parse_target(entry))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Config {
            targets,
            wordlist: self.wordlist,
            threads: self.threads,
            timeout: Duration::from_secs(self.timeout),
            append: self.append,
            output: OutputConfig {
                format: self.output,
            },
        })
    }
}
