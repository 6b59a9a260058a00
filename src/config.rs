use thiserror::Error;

use crate::output::OutputFormat;

/// Paraná NFC-e query used when no URL is supplied.
pub const DEFAULT_INVOICE_URL: &str = "https://www.fazenda.pr.gov.br/nfce/qrcode?p=41250475864728000322650080003214521736334602%7C2%7C1%7C1%7C1758E709911ADD03AF37BB91B96C3D7F4CAB93B4";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub invoice_url: String,
    pub user_agent: Option<String>,
    /// Raw `NFCE_OUTPUT`, only parsed when no `--format` flag is given
    pub output: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            invoice_url: DEFAULT_INVOICE_URL.to_string(),
            user_agent: None,
            output: None,
        }
    }
}

impl Config {
    /// Reads `NFCE_URL`, `NFCE_USER_AGENT` and `NFCE_OUTPUT`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            invoice_url: non_empty("NFCE_URL").unwrap_or_else(|| DEFAULT_INVOICE_URL.to_string()),
            user_agent: non_empty("NFCE_USER_AGENT"),
            output: non_empty("NFCE_OUTPUT"),
        }
    }

    /// Picks the output format: the command-line flag wins over `NFCE_OUTPUT`.
    pub fn output_format(&self, flag: Option<OutputFormat>) -> Result<OutputFormat, ConfigError> {
        if let Some(format) = flag {
            return Ok(format);
        }

        match &self.output {
            Some(raw) => raw
                .parse::<OutputFormat>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "NFCE_OUTPUT",
                    value: raw.clone(),
                }),
            None => Ok(OutputFormat::default()),
        }
    }
}
