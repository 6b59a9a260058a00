use std::sync::OnceLock;

use regex::Regex;

const SEFAZ_PATTERNS: [&str; 5] = ["sefaz", "fazenda", "nfce", "nfe", "consulta"];
const ACCESS_KEY_LEN: usize = 44;

/// Fields packed into the `p=` parameter of an NFC-e QR code URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrAccessKey {
    /// Chave de acesso (44 digits)
    pub access_key: String,
    /// IBGE code of the issuing state, first two digits of the key
    pub uf_code: u8,
    pub qr_version: Option<String>,
    /// 1 = production, 2 = homologation
    pub environment: Option<String>,
}

/// True when `url` is an http(s) URL that points at a state tax authority invoice endpoint.
pub fn is_sefaz_url(url: &str) -> bool {
    if !(url.contains("http://") || url.contains("https://")) {
        return false;
    }

    let lower = url.to_lowercase();
    SEFAZ_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

/// Pulls the invoice URL out of raw QR code text.
pub fn extract_invoice_url(qr_data: &str) -> Option<String> {
    let qr_data = qr_data.trim();
    if is_sefaz_url(qr_data) && !qr_data.contains(char::is_whitespace) {
        return Some(qr_data.to_string());
    }

    static URL: OnceLock<Regex> = OnceLock::new();
    let re = URL.get_or_init(|| Regex::new(r"(?i)https?://\S+").expect("static regex"));

    re.find_iter(qr_data)
        .map(|m| m.as_str())
        .find(|candidate| is_sefaz_url(candidate))
        .map(|s| s.to_string())
}

/// Decodes the access key from the `p=` query parameter, if present and well-formed.
pub fn parse_access_key(url: &str) -> Option<QrAccessKey> {
    let (_, query) = url.split_once('?')?;
    let raw = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("p="))?;

    let decoded = urlencoding::decode(raw).ok()?;
    let mut fields = decoded.split('|');

    let access_key = fields.next()?.trim();
    if access_key.len() != ACCESS_KEY_LEN || !access_key.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let uf_code: u8 = access_key[..2].parse().ok()?;
    let mut next_field = || {
        fields
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    let qr_version = next_field();
    let environment = next_field();

    Some(QrAccessKey {
        access_key: access_key.to_string(),
        uf_code,
        qr_version,
        environment,
    })
}
