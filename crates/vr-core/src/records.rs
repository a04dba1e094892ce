//! Record types flowing through the pipeline and their column layouts

use crate::error::{Error, Result};
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Reference table columns (the display-name column is always the first one)
pub mod reference_columns {
    pub const VENDOR_NAME: &str = "Vendor Name";
    pub const ADDRESS: &str = "Address";
}

/// Transaction table columns
pub mod transaction_columns {
    pub const VENDOR_NAME: &str = "Vendor Name 1";
    pub const ADDRESS_1: &str = "Vendor Address 1";
    pub const ADDRESS_2: &str = "Vendor Address 2";
    pub const ACCOUNT_NUMBER: &str = "Customer Vendor Account Number";
    pub const INVOICE_NUMBER: &str = "Invoice Number";
    pub const INVOICE_DATE: &str = "Invoice Date";
    pub const DUE_DATE: &str = "Due Date";
    pub const NET_AMOUNT: &str = "Net Amount";
    pub const CUST_ID: &str = "Cust Id";
}

/// Export columns, in output order
pub mod export_columns {
    pub const VENDOR_NAME: &str = "Vendor name";
    pub const DESCRIPTION: &str = "Description (optional)";
    pub const INVOICE_NUMBER: &str = "Invoice number";
    pub const INVOICE_DATE: &str = "Invoice date";
    pub const ACCOUNTING_DATE: &str = "Accounting date (optional)";
    pub const DUE_DATE: &str = "Due date";
    pub const CURRENCY: &str = "Currency";
    pub const LINE_ITEM_AMOUNT: &str = "Line item amount";
    pub const LINE_ITEM_DESCRIPTION: &str = "Line item description";
    pub const VENDOR_MEMO: &str = "Vendor memo (optional)";
    pub const PAYMENT_METHOD: &str = "Payment method (optional)";

    pub const ALL: [&str; 11] = [
        VENDOR_NAME,
        DESCRIPTION,
        INVOICE_NUMBER,
        INVOICE_DATE,
        ACCOUNTING_DATE,
        DUE_DATE,
        CURRENCY,
        LINE_ITEM_AMOUNT,
        LINE_ITEM_DESCRIPTION,
        VENDOR_MEMO,
        PAYMENT_METHOD,
    ];
}

/// Currency stamped on every line item
pub const DEFAULT_CURRENCY: &str = "USD";

/// Field that failed to parse and was substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseField {
    InvoiceDate,
    DueDate,
    Amount,
}

impl std::fmt::Display for ParseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseField::InvoiceDate => write!(f, "invoice date"),
            ParseField::DueDate => write!(f, "due date"),
            ParseField::Amount => write!(f, "amount"),
        }
    }
}

/// Non-fatal field problem: dates become empty, amounts become zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based data row within the stage's input
    pub row: usize,
    pub field: ParseField,
    pub value: String,
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: unparseable {} '{}'", self.row, self.field, self.value)
    }
}

/// A row of the reference (vendor master) table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Authoritative presentation name, taken from the first column
    pub display_name: String,
    pub vendor_name_raw: String,
    pub address: String,
}

impl ReferenceRecord {
    pub fn new(
        display_name: impl Into<String>,
        vendor_name_raw: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            vendor_name_raw: vendor_name_raw.into(),
            address: address.into(),
        }
    }

    /// Lowercased, trimmed address used as the second half of the lookup key
    pub fn address_key(&self) -> String {
        self.address.trim().to_lowercase()
    }

    /// Read every reference record from a table, validating the schema first
    pub fn from_table(table: &Table) -> Result<Vec<Self>> {
        use reference_columns::*;

        if table.columns.is_empty() {
            return Err(Error::EmptyTable(table.source_path.clone()));
        }
        let [vendor, address] = table.require_columns([VENDOR_NAME, ADDRESS])?;

        Ok(table
            .rows
            .iter()
            .map(|row| Self::new(row.get(0), row.get(vendor), row.get(address)))
            .collect())
    }
}

/// A row of the transaction (invoice) table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub vendor_name_raw: String,
    pub address_line1: String,
    pub address_line2: String,
    pub account_number: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: String,
    pub net_amount: String,
    pub cust_id: String,
}

impl TransactionRecord {
    /// Both address lines joined by a space, lowercased and trimmed
    ///
    /// The separator is always inserted, so a blank second line leaves no
    /// trailing space once trimmed.
    pub fn address_key(&self) -> String {
        format!(
            "{} {}",
            self.address_line1.trim().to_lowercase(),
            self.address_line2.trim().to_lowercase()
        )
        .trim()
        .to_string()
    }

    /// Read every transaction record from a table, validating the schema first
    pub fn from_table(table: &Table) -> Result<Vec<Self>> {
        use transaction_columns::*;

        let [vendor, addr1, addr2, account, invoice, invoice_date, due_date, amount, cust] = table
            .require_columns([
                VENDOR_NAME,
                ADDRESS_1,
                ADDRESS_2,
                ACCOUNT_NUMBER,
                INVOICE_NUMBER,
                INVOICE_DATE,
                DUE_DATE,
                NET_AMOUNT,
                CUST_ID,
            ])?;

        Ok(table
            .rows
            .iter()
            .map(|row| Self {
                vendor_name_raw: row.get(vendor).to_string(),
                address_line1: row.get(addr1).to_string(),
                address_line2: row.get(addr2).to_string(),
                account_number: row.get(account).to_string(),
                invoice_number: row.get(invoice).to_string(),
                invoice_date: row.get(invoice_date).to_string(),
                due_date: row.get(due_date).to_string(),
                net_amount: row.get(amount).to_string(),
                cust_id: row.get(cust).to_string(),
            })
            .collect())
    }
}

/// Canonical export row
///
/// `line_item_amount` is still the raw source text; it is only coerced to a
/// number when line items are aggregated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "Vendor name")]
    pub vendor_name: String,
    #[serde(rename = "Description (optional)")]
    pub description: String,
    #[serde(rename = "Invoice number")]
    pub invoice_number: String,
    #[serde(rename = "Invoice date")]
    pub invoice_date: String,
    #[serde(rename = "Accounting date (optional)")]
    pub accounting_date: String,
    #[serde(rename = "Due date")]
    pub due_date: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Line item amount")]
    pub line_item_amount: String,
    #[serde(rename = "Line item description")]
    pub line_item_description: String,
    #[serde(rename = "Vendor memo (optional)")]
    pub vendor_memo: String,
    #[serde(rename = "Payment method (optional)")]
    pub payment_method: String,
}

impl LineItem {
    /// Read line items back from a previously written export
    pub fn from_table(table: &Table) -> Result<Vec<Self>> {
        let [vendor, description, invoice, invoice_date, accounting_date, due_date, currency, amount, line_description, memo, payment] =
            table.require_columns(export_columns::ALL)?;

        Ok(table
            .rows
            .iter()
            .map(|row| Self {
                vendor_name: row.get(vendor).to_string(),
                description: row.get(description).to_string(),
                invoice_number: row.get(invoice).to_string(),
                invoice_date: row.get(invoice_date).to_string(),
                accounting_date: row.get(accounting_date).to_string(),
                due_date: row.get(due_date).to_string(),
                currency: row.get(currency).to_string(),
                line_item_amount: row.get(amount).to_string(),
                line_item_description: row.get(line_description).to_string(),
                vendor_memo: row.get(memo).to_string(),
                payment_method: row.get(payment).to_string(),
            })
            .collect())
    }
}

/// One aggregated row per vendor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedSummary {
    #[serde(rename = "Vendor name")]
    pub vendor_name: String,
    #[serde(rename = "Description (optional)")]
    pub description: String,
    #[serde(rename = "Invoice number")]
    pub invoice_number: String,
    #[serde(rename = "Invoice date")]
    pub invoice_date: String,
    #[serde(rename = "Accounting date (optional)")]
    pub accounting_date: String,
    #[serde(rename = "Due date")]
    pub due_date: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Line item amount")]
    pub line_item_amount: f64,
    #[serde(rename = "Line item description")]
    pub line_item_description: String,
    #[serde(rename = "Vendor memo (optional)")]
    pub vendor_memo: String,
    #[serde(rename = "Payment method (optional)")]
    pub payment_method: String,
}
