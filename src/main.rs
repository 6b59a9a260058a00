use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use nfce_cli::config::Config;
use nfce_cli::output::{write_invoice, OutputFormat};
use nfce_cli::sefaz::{extract_invoice_url, is_sefaz_url, parse_access_key};
use nfce_cli::{
    extract_invoice, fetch_invoice, ExtractOptions, Invoice, InvoiceFetcher, PairingPolicy,
};

#[derive(Parser)]
#[command(name = "nfce-cli")]
#[command(about = "NFC-e invoice extraction CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download an invoice page and print its contents
    Fetch {
        #[arg(short, long, conflicts_with = "qr")]
        url: Option<String>,

        /// Raw text read from the invoice QR code
        #[arg(long)]
        qr: Option<String>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        #[arg(long, default_value_t = false)]
        strict_pairing: bool,
    },

    /// Extract an invoice from a saved HTML page
    Parse {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short = 'o', long, value_enum)]
        format: Option<OutputFormat>,

        #[arg(long, default_value_t = false)]
        strict_pairing: bool,
    },

    /// Check a URL and decode its access key
    Inspect {
        #[arg(short, long)]
        url: String,
    },
}

fn extract_options(strict_pairing: bool) -> ExtractOptions {
    let pairing = if strict_pairing {
        PairingPolicy::Strict
    } else {
        PairingPolicy::TruncateToShorter
    };
    ExtractOptions::default().with_pairing(pairing)
}

fn resolve_url(url: Option<String>, qr: Option<String>, config: &Config) -> Result<String> {
    if let Some(qr) = qr {
        return extract_invoice_url(&qr).context("QR data does not contain a SEFAZ invoice URL");
    }

    let url = url.unwrap_or_else(|| config.invoice_url.clone());
    if !is_sefaz_url(&url) {
        warn!("{} does not look like a SEFAZ invoice URL", url);
    }
    Ok(url)
}

fn print_invoice(invoice: &Invoice, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_invoice(invoice, format, &mut handle)?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    dotenv::dotenv().ok();
    let config = Config::from_env();

    match cli.command {
        Commands::Fetch {
            url,
            qr,
            format,
            strict_pairing,
        } => {
            let format = config.output_format(format)?;
            let url = resolve_url(url, qr, &config)?;
            let fetcher = InvoiceFetcher::new(config.user_agent.as_deref())?;

            let invoice = fetch_invoice(&fetcher, &url, &extract_options(strict_pairing)).await?;
            print_invoice(&invoice, format)?;
        }

        Commands::Parse {
            file,
            format,
            strict_pairing,
        } => {
            let format = config.output_format(format)?;
            info!("Reading invoice page from {}", file.display());
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let invoice = extract_invoice(&html, &extract_options(strict_pairing))?;
            print_invoice(&invoice, format)?;
        }

        Commands::Inspect { url } => {
            println!("URL: {}", url);
            println!("SEFAZ endpoint: {}", if is_sefaz_url(&url) { "yes" } else { "no" });

            let Some(key) = parse_access_key(&url) else {
                bail!("No NFC-e access key found in URL");
            };

            println!("Access key: {}", key.access_key);
            println!("UF code: {}", key.uf_code);
            if let Some(version) = &key.qr_version {
                println!("QR version: {}", version);
            }
            if let Some(environment) = &key.environment {
                println!("Environment: {}", environment);
            }
        }
    }

    Ok(())
}
