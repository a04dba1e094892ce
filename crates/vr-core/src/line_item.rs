//! Mapping resolved transactions onto the canonical export row
//!
//! Text that spreadsheet tools would otherwise coerce (account numbers with
//! leading zeros, long digit strings) is written as a display literal:
//! `="0042"`. [`strip_display_literal`] undoes the wrapping before grouping.

use crate::dates::to_iso_date;
use crate::records::{LineItem, TransactionRecord, DEFAULT_CURRENCY};

const LITERAL_PREFIX: &str = "=\"";
const LITERAL_SUFFIX: &str = "\"";

/// Wrap a value so spreadsheets render it as literal text
///
/// Embedded quotes are doubled, as in a spreadsheet string literal.
pub fn wrap_display_literal(value: &str) -> String {
    format!(
        "{LITERAL_PREFIX}{}{LITERAL_SUFFIX}",
        value.replace('"', "\"\"")
    )
}

/// Remove the display-literal wrapper, leaving unwrapped values untouched
pub fn strip_display_literal(value: &str) -> String {
    match value
        .strip_prefix(LITERAL_PREFIX)
        .and_then(|rest| rest.strip_suffix(LITERAL_SUFFIX))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => value.to_string(),
    }
}

/// Build the export row for one transaction
pub fn build_line_item(transaction: &TransactionRecord, resolved_vendor_name: &str) -> LineItem {
    let description = if transaction.account_number.is_empty() {
        String::new()
    } else {
        wrap_display_literal(&transaction.account_number)
    };

    LineItem {
        vendor_name: resolved_vendor_name.to_string(),
        description,
        invoice_number: transaction.invoice_number.clone(),
        invoice_date: to_iso_date(&transaction.invoice_date),
        accounting_date: String::new(),
        due_date: to_iso_date(&transaction.due_date),
        currency: DEFAULT_CURRENCY.to_string(),
        line_item_amount: transaction.net_amount.clone(),
        line_item_description: transaction.cust_id.clone(),
        vendor_memo: String::new(),
        payment_method: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction() -> TransactionRecord {
        TransactionRecord {
            vendor_name_raw: "ACME 12".into(),
            address_line1: "1 Main".into(),
            address_line2: String::new(),
            account_number: "000123".into(),
            invoice_number: "INV-9".into(),
            invoice_date: "01/05/2024".into(),
            due_date: "not a date".into(),
            net_amount: "12.345".into(),
            cust_id: "C-77".into(),
        }
    }

    #[test]
    fn test_wrap_display_literal() {
        assert_eq!(wrap_display_literal("000123"), "=\"000123\"");
        assert_eq!(wrap_display_literal("a\"b"), "=\"a\"\"b\"");
    }

    #[test]
    fn test_strip_display_literal() {
        assert_eq!(strip_display_literal("=\"000123\""), "000123");
        assert_eq!(strip_display_literal("=\"\""), "");
        assert_eq!(strip_display_literal("plain"), "plain");
        assert_eq!(strip_display_literal("=\"unterminated"), "=\"unterminated");
        assert_eq!(strip_display_literal("=\""), "=\"");
    }

    #[test]
    fn test_strip_then_wrap_restores_wrapped_form() {
        for raw in ["000123", "a, b", "x\"y", " spaced "] {
            let wrapped = wrap_display_literal(raw);
            let stripped = strip_display_literal(&wrapped);
            assert_eq!(stripped, raw);
            assert_eq!(wrap_display_literal(&stripped), wrapped);
        }
    }

    #[test]
    fn test_build_line_item_maps_fields() {
        let item = build_line_item(&transaction(), "Acme Corporation");

        assert_eq!(item.vendor_name, "Acme Corporation");
        assert_eq!(item.description, "=\"000123\"");
        assert_eq!(item.invoice_number, "INV-9");
        assert_eq!(item.invoice_date, "2024-01-05");
        assert_eq!(item.due_date, "");
        assert_eq!(item.currency, "USD");
        assert_eq!(item.line_item_amount, "12.345");
        assert_eq!(item.line_item_description, "C-77");
        assert!(item.accounting_date.is_empty());
        assert!(item.vendor_memo.is_empty());
        assert!(item.payment_method.is_empty());
    }

    #[test]
    fn test_empty_account_number_is_not_wrapped() {
        let mut tx = transaction();
        tx.account_number.clear();
        let item = build_line_item(&tx, "Acme");

        assert_eq!(item.description, "");
    }

    #[test]
    fn test_amount_is_not_coerced_yet() {
        let mut tx = transaction();
        tx.net_amount = "n/a".into();
        let item = build_line_item(&tx, "Acme");

        assert_eq!(item.line_item_amount, "n/a");
    }
}
