use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::invoice::Invoice;
use crate::normalizer::format_brl;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON, accented characters kept as-is
    #[default]
    Json,
    /// Semicolon-separated rows, one per item
    Csv,
    /// Aligned table for reading in a terminal
    Table,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            other => Err(format!("Unsupported output format: {}", other)),
        }
    }
}

pub fn write_invoice<W: Write>(invoice: &Invoice, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(invoice, out),
        OutputFormat::Csv => write_csv(invoice, out),
        OutputFormat::Table => write_table(invoice, out),
    }
}

/// Four-space indentation; serde_json never escapes non-ASCII text.
pub fn write_json<W: Write>(invoice: &Invoice, out: &mut W) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut *out, formatter);
    invoice
        .serialize(&mut serializer)
        .context("Failed to serialize invoice as JSON")?;
    writeln!(out)?;
    Ok(())
}

#[derive(Serialize)]
struct CsvRow<'a> {
    nome_estabelecimento: &'a str,
    cnpj: &'a str,
    nome_produto: &'a str,
    preco: &'a str,
}

pub fn write_csv<W: Write>(invoice: &Invoice, out: &mut W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(&mut *out);

    if invoice.items.is_empty() {
        writer.write_record(["nome_estabelecimento", "cnpj", "nome_produto", "preco"])?;
    }

    for item in &invoice.items {
        writer
            .serialize(CsvRow {
                nome_estabelecimento: &invoice.establishment_name,
                cnpj: &invoice.tax_id,
                nome_produto: &item.name,
                preco: &item.price,
            })
            .context("Failed to write CSV row")?;
    }

    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn write_table<W: Write>(invoice: &Invoice, out: &mut W) -> Result<()> {
    writeln!(out, "{}", invoice.establishment_name)?;
    writeln!(out, "{}", invoice.tax_id)?;
    writeln!(out, "\n{:<4} {:<50} {:>14}", "#", "Produto", "Preço")?;
    writeln!(out, "{}", "-".repeat(70))?;

    for (idx, item) in invoice.items.iter().enumerate() {
        writeln!(
            out,
            "{:<4} {:<50} {:>14}",
            idx + 1,
            item.name,
            format_brl(&item.price)
        )?;
    }

    writeln!(out, "{}", "-".repeat(70))?;
    writeln!(out, "{} item(s)", invoice.items.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::Item;

    fn sample() -> Invoice {
        Invoice {
            establishment_name: "Loja Teste".to_string(),
            tax_id: "12.345.678/0001-99".to_string(),
            items: vec![
                Item {
                    name: "Arroz".to_string(),
                    price: "10.00".to_string(),
                },
                Item {
                    name: "Feijão".to_string(),
                    price: "8.50".to_string(),
                },
            ],
        }
    }

    fn render(format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_invoice(&sample(), format, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_json_keeps_accents_and_four_space_indent() {
        let text = render(OutputFormat::Json);

        assert!(text.contains("Feijão"));
        assert!(!text.contains("\\u"));
        assert!(text.contains("\n    \"nome_estabelecimento\": \"Loja Teste\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_csv_rows() {
        let text = render(OutputFormat::Csv);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "nome_estabelecimento;cnpj;nome_produto;preco");
        assert_eq!(lines[1], "Loja Teste;12.345.678/0001-99;Arroz;10.00");
        assert_eq!(lines[2], "Loja Teste;12.345.678/0001-99;Feijão;8.50");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_header_without_items() {
        let mut invoice = sample();
        invoice.items.clear();

        let mut buf = Vec::new();
        write_csv(&invoice, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "nome_estabelecimento;cnpj;nome_produto;preco\n"
        );
    }

    #[test]
    fn test_table_shows_brl_prices() {
        let text = render(OutputFormat::Table);

        assert!(text.starts_with("Loja Teste\n"));
        assert!(text.contains("R$ 8,50"));
        assert!(text.contains("2 item(s)"));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!(" table ".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
