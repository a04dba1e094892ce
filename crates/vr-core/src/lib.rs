//! vr-core: Core library for reconciling vendor names and aggregating invoice exports
//!
//! This library provides functionality to:
//! - Read reference (vendor master) and transaction tables from CSV
//! - Normalize vendor names and fold known aliases together
//! - Resolve each transaction to the reference display name, falling back to its raw name
//! - Map transactions onto the canonical line-item export
//! - Group line items into one summary row per vendor
//! - Run batches of transaction files against one cached reference lookup

pub mod aggregate;
pub mod cache;
pub mod dates;
pub mod error;
pub mod job;
pub mod line_item;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod records;
pub mod resolver;
pub mod scanner;
pub mod table;
pub mod writer;

pub use aggregate::{
    aggregate, aggregate_with_warnings, parse_amount, parse_amount_units, round_cents,
    units_to_cents,
};
pub use cache::CachedLookup;
pub use dates::{parse_date, to_iso_date};
pub use error::{Error, Result};
pub use job::{run_job, BatchResult, InputResult, JobFile};
pub use line_item::{build_line_item, strip_display_literal, wrap_display_literal};
pub use normalize::{custom_normalize, normalize, VENDOR_ALIASES};
pub use parser::{parse_csv, parse_csv_str};
pub use pipeline::{group_table, process_tables, run, run_records, RunOutput, RunReport};
pub use records::{
    GroupedSummary, LineItem, ParseField, ParseWarning, ReferenceRecord, TransactionRecord,
};
pub use resolver::{LookupKey, Resolution, VendorLookup};
pub use scanner::discover_inputs;
pub use table::{Column, Row, Table};
pub use writer::{
    line_items_to_string, summary_to_string, write_line_items, write_run_output, write_summary,
    OutputNames, WrittenFiles,
};
