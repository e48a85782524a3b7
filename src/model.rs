use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

#[derive(Debug, Clone)]
pub struct Target {
    pub original: TargetSpec,
    pub resolved: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub targets: Vec<TargetSpec>,
    pub wordlist: String,
    pub threads: usize,
    pub timeout: Duration,
    pub append: String,
    pub output: OutputConfig,
}

/// Parsed view of one HTTP response, keyed by the vhost name that
/// produced it. All fields are kept as strings so the baseline check is
/// a plain field-by-field equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub vhost: String,
    pub code: String,
    pub status: String,
    pub length: String,
    pub location: String,
}

/// Signature of the phantom response a server gives for vhost names it
/// does not recognize. The vhost name itself is irrelevant here.
#[derive(Debug, Clone)]
pub struct Baseline {
    pub code: String,
    pub status: String,
    pub length: String,
    pub location: String,
}

impl Baseline {
    pub fn matches(&self, result: &ProbeResult) -> bool {
        self.code == result.code
            && self.status == result.status
            && self.length == result.length
            && self.location == result.location
    }
}

impl From<ProbeResult> for Baseline {
    fn from(result: ProbeResult) -> Self {
        Baseline {
            code: result.code,
            status: result.status,
            length: result.length,
            location: result.location,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ValueEnum, Eq, PartialEq)]
pub enum OutputFormat {
    /// Semicolon-joined `vhost;code;status;length;location` lines.
    Lines,
    Jsonl,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Lines => write!(f, "lines"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Run statistics reported once all worker pools have drained.
#[derive(Debug, Clone, Copy)]
pub struct Summary {
    pub targets: usize,
    pub requests: usize,
    pub elapsed: Duration,
}

impl Summary {
    pub fn per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.requests as f64 / secs
        } else {
            self.requests as f64
        }
    }
}
