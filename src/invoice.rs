use serde::Serialize;

/// A consumer invoice (NFC-e) as read from the SEFAZ query page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    /// Store that issued the invoice (razão social / nome fantasia)
    #[serde(rename = "nome_estabelecimento")]
    pub establishment_name: String,
    /// CNPJ line as printed on the page
    #[serde(rename = "cnpj")]
    pub tax_id: String,
    /// Purchased items in page order
    #[serde(rename = "produtos")]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    #[serde(rename = "nome_produto")]
    pub name: String,
    /// Decimal string with `.` as separator, no currency marker
    #[serde(rename = "preco")]
    pub price: String,
}
