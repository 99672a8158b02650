use anyhow::Result;
use clap::Parser;

use spedy_emitter::{
    config::{HttpConfig, InvoicingConfig, LogConfig, StoreConfig},
    db::SqliteStore,
    logging,
    spedy::InvoicingClient,
    submitter::InvoiceSubmitter,
};

/// Emit service invoices for approved transactions.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Woovi, EFI Bank or LunoxPay transaction ids
    #[arg(required = true)]
    references: Vec<String>,

    #[command(flatten)]
    invoicing: InvoicingConfig,

    #[command(flatten)]
    http: HttpConfig,

    #[command(flatten)]
    store: StoreConfig,

    #[command(flatten)]
    log: LogConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    logging::init(cli.log.log_json);

    let store = SqliteStore::open(&cli.store.database, cli.store.pool_size)?;
    let client = InvoicingClient::new(cli.http.client()?, cli.invoicing);

    tracing::info!(endpoint = %client.endpoint(), database = ?cli.store.database, "starting");

    let submitter = InvoiceSubmitter::new(store, client);

    let mut found = 0;
    for reference in &cli.references {
        if submitter.submit(reference).await.is_some() {
            found += 1;
        }
    }

    tracing::info!(found, total = cli.references.len(), "done");

    Ok(())
}
