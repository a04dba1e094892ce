//! End-to-end run: reference + transactions → line items → grouped summary
//!
//! The two stages meet only at [`LineItem`]: stage one emits canonical rows
//! with display-literal wrapping, stage two strips the wrapping and groups
//! them. Either stage can run on its own.

use crate::aggregate::aggregate_with_warnings;
use crate::error::Result;
use crate::line_item::build_line_item;
use crate::records::{
    GroupedSummary, LineItem, ParseField, ParseWarning, ReferenceRecord, TransactionRecord,
};
use crate::resolver::VendorLookup;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Counters and substitutions for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub transactions: usize,
    pub matched: usize,
    pub fallbacks: usize,
    pub summary_rows: usize,
    pub warnings: Vec<ParseWarning>,
}

/// Both output record sets plus the report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOutput {
    pub line_items: Vec<LineItem>,
    pub summary: Vec<GroupedSummary>,
    pub report: RunReport,
}

/// Stage one: resolve every transaction and map it to a line item
pub fn build_line_items(
    transactions: &[TransactionRecord],
    lookup: &VendorLookup,
    report: &mut RunReport,
) -> Vec<LineItem> {
    let mut items = Vec::with_capacity(transactions.len());

    for (idx, transaction) in transactions.iter().enumerate() {
        let row = idx + 1;
        let resolution = lookup.resolve(transaction);
        if resolution.is_match() {
            report.matched += 1;
        } else {
            report.fallbacks += 1;
        }

        let item = build_line_item(transaction, resolution.name());

        for (field, raw, parsed) in [
            (ParseField::InvoiceDate, &transaction.invoice_date, &item.invoice_date),
            (ParseField::DueDate, &transaction.due_date, &item.due_date),
        ] {
            if !raw.trim().is_empty() && parsed.is_empty() {
                warn!(row, %field, value = %raw, "unparseable date left empty");
                report.warnings.push(ParseWarning {
                    row,
                    field,
                    value: raw.clone(),
                });
            }
        }

        items.push(item);
    }

    report.transactions += transactions.len();
    items
}

/// Stage two: group line items into the per-vendor summary
pub fn group_line_items(items: &[LineItem], report: &mut RunReport) -> Vec<GroupedSummary> {
    let summary = aggregate_with_warnings(items, &mut report.warnings);
    report.summary_rows += summary.len();
    summary
}

/// Run both stages for a transaction table against an existing lookup
///
/// The transaction schema is validated before anything is produced.
pub fn run(lookup: &VendorLookup, transactions: &Table) -> Result<RunOutput> {
    let records = TransactionRecord::from_table(transactions)?;
    Ok(run_records(lookup, &records, &transactions.source_path))
}

/// Run both stages over already-validated transaction records
pub fn run_records(
    lookup: &VendorLookup,
    records: &[TransactionRecord],
    source: &Path,
) -> RunOutput {
    let mut report = RunReport::default();

    let line_items = build_line_items(records, lookup, &mut report);
    let summary = group_line_items(&line_items, &mut report);

    info!(
        source = %source.display(),
        transactions = report.transactions,
        matched = report.matched,
        fallbacks = report.fallbacks,
        vendors = report.summary_rows,
        warnings = report.warnings.len(),
        "processed transactions"
    );

    RunOutput {
        line_items,
        summary,
        report,
    }
}

/// Build the lookup from a reference table and run both stages
///
/// Both schemas are checked up front so a bad transaction file does not cost
/// a lookup build, and nothing is produced unless both are valid.
pub fn process_tables(reference: &Table, transactions: &Table) -> Result<RunOutput> {
    let references = ReferenceRecord::from_table(reference)?;
    let records = TransactionRecord::from_table(transactions)?;

    let lookup = VendorLookup::build(&references);
    Ok(run_records(&lookup, &records, &transactions.source_path))
}

/// Group an existing line-item export (stage two only)
pub fn group_table(line_items: &Table) -> Result<RunOutput> {
    let items = LineItem::from_table(line_items)?;
    let mut report = RunReport::default();
    let summary = group_line_items(&items, &mut report);

    info!(
        source = %line_items.source_path.display(),
        line_items = items.len(),
        vendors = summary.len(),
        "grouped line items"
    );

    Ok(RunOutput {
        line_items: items,
        summary,
        report,
    })
}
