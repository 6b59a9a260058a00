use std::sync::OnceLock;

use regex::Regex;

const CURRENCY_MARKER: &str = "R$";

/// How a raw text node from the invoice page should be cleaned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Monetary value: `"R$ 1.234,56"` becomes `"1234.56"`.
    Price,
    /// Free text: trimmed, with `;` replaced by `,`.
    Generic,
}

pub fn normalize(raw: &str, mode: NormalizeMode) -> String {
    match mode {
        NormalizeMode::Price => normalize_price(raw),
        NormalizeMode::Generic => raw.replace(';', ",").trim().to_string(),
    }
}

fn normalize_price(raw: &str) -> String {
    let value = raw.replace(CURRENCY_MARKER, "");
    let value = value.trim();

    // Only a decimal comma marks the pt-BR layout; plain "12.50" passes through.
    if value.contains(',') {
        value.replace('.', "").replace(',', ".")
    } else {
        value.to_string()
    }
}

/// Collapses every whitespace run (tabs, newlines, spaces) into a single space.
pub fn collapse_whitespace(raw: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    re.replace_all(raw.trim(), " ").into_owned()
}

/// Renders a normalized price string as Brazilian currency, e.g. `"1234.5"` -> `"R$ 1.234,50"`.
/// Values that are not plain decimals with at most two fraction digits are returned untouched.
pub fn format_brl(price: &str) -> String {
    let (integer, fraction) = match price.split_once('.') {
        Some((i, f)) => (i, f),
        None => (price, ""),
    };

    let (sign, digits) = match integer.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer),
    };

    if digits.is_empty()
        || fraction.len() > 2
        || !digits.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return price.to_string();
    }

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let cents = format!("{:0<2}", fraction);
    format!("{}{} {},{}", sign, CURRENCY_MARKER, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_strips_currency_and_comma() {
        assert_eq!(normalize("R$ 12,50", NormalizeMode::Price), "12.50");
        assert_eq!(normalize("  R$10,00 \n", NormalizeMode::Price), "10.00");
    }

    #[test]
    fn test_price_drops_thousands_separator() {
        assert_eq!(normalize("R$ 1.234,56", NormalizeMode::Price), "1234.56");
    }

    #[test]
    fn test_price_is_idempotent() {
        for raw in ["R$ 12,50", "R$ 1.234,56", "0,99", "8.50"] {
            let once = normalize(raw, NormalizeMode::Price);
            let twice = normalize(&once, NormalizeMode::Price);
            assert_eq!(once, twice, "normalizing {:?} twice changed it", raw);
        }
    }

    #[test]
    fn test_generic_replaces_semicolons() {
        assert_eq!(
            normalize("  ARROZ; TIPO 1 ", NormalizeMode::Generic),
            "ARROZ, TIPO 1"
        );
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("\n CNPJ:\n\t\t    12.345.678/0001-99\t "),
            "CNPJ: 12.345.678/0001-99"
        );
        assert_eq!(collapse_whitespace("a\t\tb\n\nc"), "a b c");
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl("10.00"), "R$ 10,00");
        assert_eq!(format_brl("8.5"), "R$ 8,50");
        assert_eq!(format_brl("1234.56"), "R$ 1.234,56");
        assert_eq!(format_brl("1234567"), "R$ 1.234.567,00");
        assert_eq!(format_brl("n/a"), "n/a");
    }

    #[test]
    fn test_format_brl_keeps_sub_cent_values_untouched() {
        assert_eq!(format_brl("1.005"), "1.005");
        assert_eq!(format_brl("0.1234"), "0.1234");
    }
}
