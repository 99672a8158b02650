use std::{path::PathBuf, time::Duration};

use reqwest::{Client, Url};

pub const DEFAULT_ENDPOINT: &str = "https://api.spedy.com.br/v1/service-invoices";

/// Where and how to reach the invoicing API.
#[derive(Clone, clap::Args)]
pub struct InvoicingConfig {
    /// Service-invoice endpoint
    #[arg(long, env = "SPEDY_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: Url,

    /// Value of the `X-Api-Key` header
    #[arg(long, env = "SPEDY_API_KEY", hide_env_values = true)]
    pub api_key: String,
}

// Hand-written so the key never ends up in logs.
impl std::fmt::Debug for InvoicingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoicingConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds; unset means wait forever
    #[arg(long, env = "SPEDY_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn client(&self) -> reqwest::Result<Client> {
        let mut builder = Client::builder();

        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct StoreConfig {
    /// SQLite database holding the `transacoes` table
    #[arg(long, env = "DATABASE_PATH")]
    pub database: PathBuf,

    #[arg(
        long,
        env = "DATABASE_POOL_SIZE",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub pool_size: u32,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogConfig {
    /// Log as JSON lines
    #[arg(long, env = "LOG_JSON", value_parser = clap::builder::FalseyValueParser::new())]
    pub log_json: bool,
}
