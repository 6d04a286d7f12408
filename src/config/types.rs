//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    BRIDGE_PORT_ENV, DEFAULT_BRIDGE_HOST, DEFAULT_BRIDGE_PORT, DEFAULT_TIMEOUT_SECS,
};
use crate::session::Browser;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use tlsbatch::Config;
///
/// let config = Config {
///     bridge_port: 9000,
///     ..Default::default()
/// };
/// assert_eq!(config.bridge_base_url(), "http://127.0.0.1:9000");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Host of the bridge process
    pub bridge_host: String,

    /// Port of the bridge process
    pub bridge_port: u16,

    /// Per-request timeout in seconds, forwarded to the bridge
    pub timeout_seconds: u64,

    /// Browser fingerprint the bridge should emulate
    pub browser: Browser,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Config {
    /// Base URL of the bridge, without a trailing slash.
    pub fn bridge_base_url(&self) -> String {
        format!("http://{}:{}", self.bridge_host, self.bridge_port)
    }

    /// Default configuration with the bridge port taken from the environment.
    ///
    /// An unparsable port value is ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(BRIDGE_PORT_ENV) {
            match raw.trim().parse::<u16>() {
                Ok(port) => config.bridge_port = port,
                Err(e) => log::warn!("Ignoring invalid {BRIDGE_PORT_ENV} value '{raw}': {e}"),
            }
        }
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge_host: DEFAULT_BRIDGE_HOST.to_string(),
            bridge_port: DEFAULT_BRIDGE_PORT,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            browser: Browser::default(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

/// Command-line options for the `tlsbatch` binary.
#[derive(Debug, Parser)]
#[command(
    name = "tlsbatch",
    about = "Send one or more requests through the fingerprinting bridge in a single batch."
)]
pub struct Opt {
    /// URLs to request; more than one URL is sent as a single batch
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// HTTP method used for every URL
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Extra request header, as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Browser fingerprint to emulate
    #[arg(long, value_enum, default_value_t = Browser::Firefox)]
    pub browser: Browser,

    /// Bridge host
    #[arg(long, default_value = DEFAULT_BRIDGE_HOST)]
    pub bridge_host: String,

    /// Bridge port
    #[arg(long, env = BRIDGE_PORT_ENV, default_value_t = DEFAULT_BRIDGE_PORT)]
    pub bridge_port: u16,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Print response bodies after the status line
    #[arg(long)]
    pub show_body: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Opt {
    /// Splits the `--header` values into name/value pairs.
    ///
    /// Values without a colon are skipped with a warning.
    pub fn parsed_headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .filter_map(|raw| match raw.split_once(':') {
                Some((name, value)) => Some((name.trim().to_string(), value.trim().to_string())),
                None => {
                    log::warn!("Ignoring malformed header '{raw}' (expected 'Name: value')");
                    None
                }
            })
            .collect()
    }
}

impl From<&Opt> for Config {
    fn from(opt: &Opt) -> Self {
        Self {
            bridge_host: opt.bridge_host.clone(),
            bridge_port: opt.bridge_port,
            timeout_seconds: opt.timeout,
            browser: opt.browser,
            log_level: opt.log_level.clone(),
            log_format: opt.log_format.clone(),
        }
    }
}
