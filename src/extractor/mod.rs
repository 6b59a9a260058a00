use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::invoice::{Invoice, Item};
use crate::normalizer::{collapse_whitespace, normalize, NormalizeMode};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Missing expected element for {field} (selector `{selector}`)")]
    MissingElement { field: &'static str, selector: String },
    #[error("Invalid CSS selector `{0}`")]
    InvalidSelector(String),
    #[error("Product count mismatch: {names} names but {prices} prices")]
    CountMismatch { names: usize, prices: usize },
}

/// What to do when the page lists a different number of product names and prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PairingPolicy {
    /// Zip positionally and drop the unmatched tail.
    #[default]
    TruncateToShorter,
    /// Refuse to build an invoice from unequal lists.
    Strict,
}

/// CSS selectors locating each invoice field on the SEFAZ page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub header: String,
    pub detail: String,
    pub product_title: String,
    pub product_price: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            header: "div.txtTopo".to_string(),
            detail: "div.text".to_string(),
            product_title: "span.txtTit2".to_string(),
            product_price: "span.valor".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub markers: Markers,
    pub pairing: PairingPolicy,
}

impl ExtractOptions {
    pub fn with_pairing(mut self, pairing: PairingPolicy) -> Self {
        self.pairing = pairing;
        self
    }
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::InvalidSelector(css.to_string()))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn first_text(
    document: &Html,
    css: &str,
    field: &'static str,
) -> Result<String, ExtractError> {
    let sel = selector(css)?;
    document
        .select(&sel)
        .next()
        .map(element_text)
        .ok_or_else(|| ExtractError::MissingElement {
            field,
            selector: css.to_string(),
        })
}

fn all_texts(document: &Html, css: &str) -> Result<Vec<String>, ExtractError> {
    let sel = selector(css)?;
    Ok(document.select(&sel).map(element_text).collect())
}

/// Pairs names with prices according to `policy`, keeping document order.
pub fn pair_items(
    names: Vec<String>,
    prices: Vec<String>,
    policy: PairingPolicy,
) -> Result<Vec<Item>, ExtractError> {
    if names.len() != prices.len() {
        match policy {
            PairingPolicy::Strict => {
                return Err(ExtractError::CountMismatch {
                    names: names.len(),
                    prices: prices.len(),
                });
            }
            PairingPolicy::TruncateToShorter => {
                warn!(
                    "Found {} product names but {} prices, keeping the first {}",
                    names.len(),
                    prices.len(),
                    names.len().min(prices.len())
                );
            }
        }
    }

    Ok(names
        .into_iter()
        .zip(prices)
        .map(|(name, price)| Item {
            name: normalize(&name, NormalizeMode::Generic),
            price: normalize(&price, NormalizeMode::Price),
        })
        .collect())
}

/// Parses an NFC-e query page into an [`Invoice`]. Does no I/O.
pub fn extract_invoice(html: &str, options: &ExtractOptions) -> Result<Invoice, ExtractError> {
    let document = Html::parse_document(html);
    let markers = &options.markers;

    let establishment_name = first_text(&document, &markers.header, "establishment name")?;
    let tax_id = first_text(&document, &markers.detail, "tax id")?;

    let names = all_texts(&document, &markers.product_title)?;
    let prices = all_texts(&document, &markers.product_price)?;
    debug!(
        "Matched {} product names and {} prices",
        names.len(),
        prices.len()
    );

    let items = pair_items(names, prices, options.pairing)?;

    let invoice = Invoice {
        establishment_name: normalize(&establishment_name, NormalizeMode::Generic),
        tax_id: collapse_whitespace(&normalize(&tax_id, NormalizeMode::Generic)),
        items,
    };

    info!(
        "Parsed invoice from {} with {} items",
        invoice.establishment_name,
        invoice.items.len()
    );
    Ok(invoice)
}
