pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod invoice;
pub mod normalizer;
pub mod output;
pub mod sefaz;

use anyhow::Result;
use tracing::info;

pub use extractor::{extract_invoice, ExtractError, ExtractOptions, Markers, PairingPolicy};
pub use fetcher::InvoiceFetcher;
pub use invoice::{Invoice, Item};

/// Downloads the invoice page at `url` and extracts it.
pub async fn fetch_invoice(
    fetcher: &InvoiceFetcher,
    url: &str,
    options: &ExtractOptions,
) -> Result<Invoice> {
    if let Some(key) = sefaz::parse_access_key(url) {
        info!("Fetching NFC-e {} (UF {})", key.access_key, key.uf_code);
    }

    let html = fetcher.fetch(url).await?;
    let invoice = extract_invoice(&html, options)?;
    Ok(invoice)
}
