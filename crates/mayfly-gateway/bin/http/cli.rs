use clap::{Parser, ValueEnum};
use mayfly_gateway::telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "MAYFLY_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "MAYFLY_PUBLIC_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "MAYFLY_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "MAYFLY_MYSQL_DSN";
pub const SWEEP_INTERVAL_ENV: &str = "MAYFLY_SWEEP_INTERVAL_SECS";
pub const REQUEST_TIMEOUT_ENV: &str = "MAYFLY_REQUEST_TIMEOUT_SECS";
pub const CODE_ATTEMPTS_ENV: &str = "MAYFLY_CODE_ATTEMPTS";
pub const CLICK_TIMEOUT_ENV: &str = "MAYFLY_CLICK_TIMEOUT_MS";
pub const PASTE_EXPIRY_HOURS_ENV: &str = "MAYFLY_PASTE_EXPIRY_HOURS";
pub const LOG_FORMAT_ENV: &str = "MAYFLY_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "mayfly", about = "URL shortener and pastebin HTTP server")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix of the `short_url` links handed out on creation.
    #[arg(long, env = PUBLIC_BASE_URL_ENV, default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Seconds between expiration sweeps; 0 disables the sweeper.
    #[arg(long, env = SWEEP_INTERVAL_ENV, default_value_t = 300)]
    pub sweep_interval_secs: u64,

    #[arg(long, env = REQUEST_TIMEOUT_ENV, default_value_t = 15)]
    pub request_timeout_secs: u64,

    /// Generated short codes tried before a collision is reported.
    #[arg(
        long,
        env = CODE_ATTEMPTS_ENV,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub code_attempts: u32,

    /// Milliseconds a redirect waits for click recording before skipping it.
    #[arg(long, env = CLICK_TIMEOUT_ENV, default_value_t = 2_000)]
    pub click_timeout_ms: u64,

    /// Lifetime of pastes created without `expire_in`.
    #[arg(
        long,
        env = PASTE_EXPIRY_HOURS_ENV,
        default_value_t = 24,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub paste_expiry_hours: u32,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl CLI {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The configured click timeout, capped at half the request deadline.
    pub fn click_timeout(&self) -> Duration {
        Duration::from_millis(self.click_timeout_ms).min(self.request_timeout() / 2)
    }
}
