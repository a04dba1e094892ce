//! Grouping of line items into one summary row per vendor

use crate::dates::{format_iso, parse_date};
use crate::line_item::{strip_display_literal, wrap_display_literal};
use crate::records::{GroupedSummary, LineItem, ParseField, ParseWarning};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Separator between merged descriptions (space before the comma is expected by consumers)
pub const DESCRIPTION_SEPARATOR: &str = " ,";

/// Separator for every other merged text column
pub const VALUE_SEPARATOR: &str = ", ";

/// Sub-cent units per currency unit; amounts are summed exactly at this scale
pub const AMOUNT_SCALE: i128 = 1_000_000_000;

const SCALE_DIGITS: usize = 9;

/// Exact fixed-point value of a plain decimal string (`-12.345`, `.5`, `7.`)
///
/// Digits past the ninth decimal place are truncated, which never moves a
/// value across a half-cent boundary.
fn parse_decimal_units(s: &str) -> Option<i128> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut units: i128 = 0;
    for b in whole.bytes() {
        units = units.checked_mul(10)?.checked_add(i128::from(b - b'0'))?;
    }
    units = units.checked_mul(AMOUNT_SCALE)?;

    let mut place = AMOUNT_SCALE;
    for b in frac.bytes().take(SCALE_DIGITS) {
        place /= 10;
        units = units.checked_add(i128::from(b - b'0') * place)?;
    }

    Some(if negative { -units } else { units })
}

/// Coerce an amount cell to exact sub-cent units ([`AMOUNT_SCALE`] per unit)
///
/// Accepts thousands separators and a leading `$`. Exponent forms go
/// through `f64` first. Returns `None` for anything else that does not parse
/// to a finite number.
pub fn parse_amount_units(raw: &str) -> Option<i128> {
    let cleaned = raw.trim().replace(',', "");
    let cleaned = match cleaned.strip_prefix('-') {
        Some(rest) => format!("-{}", rest.trim_start_matches('$')),
        None => cleaned.trim_start_matches('$').to_string(),
    };

    parse_decimal_units(&cleaned).or_else(|| {
        let value = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;
        parse_decimal_units(&format!("{value:.9}"))
    })
}

/// Coerce an amount cell to a number
pub fn parse_amount(raw: &str) -> Option<f64> {
    parse_amount_units(raw).map(|units| units as f64 / AMOUNT_SCALE as f64)
}

/// Round exact sub-cent units to whole cents, half away from zero
pub fn units_to_cents(units: i128) -> i128 {
    let per_cent = AMOUNT_SCALE / 100;
    let cents = units / per_cent;
    let remainder = units % per_cent;
    if remainder.abs() * 2 >= per_cent {
        cents + units.signum()
    } else {
        cents
    }
}

/// Round to cents, half away from zero, using the value's shortest decimal form
///
/// `1.005` rounds to `1.01` even though the nearest `f64` lies just below it.
pub fn round_cents(value: f64) -> f64 {
    match parse_decimal_units(&value.to_string()) {
        Some(units) => units_to_cents(units) as f64 / 100.0,
        None => value,
    }
}

/// Distinct non-empty values in order of first appearance
#[derive(Debug, Default)]
struct DistinctValues {
    values: Vec<String>,
    seen: HashSet<String>,
}

impl DistinctValues {
    fn push(&mut self, value: &str) {
        if value.trim().is_empty() || self.seen.contains(value) {
            return;
        }
        self.seen.insert(value.to_string());
        self.values.push(value.to_string());
    }

    fn join(&self, separator: &str) -> String {
        self.values.join(separator)
    }
}

#[derive(Debug)]
struct Group {
    vendor_name: String,
    descriptions: DistinctValues,
    invoice_numbers: DistinctValues,
    invoice_date: Option<NaiveDate>,
    accounting_dates: DistinctValues,
    due_date: Option<NaiveDate>,
    currencies: DistinctValues,
    total_units: i128,
    line_descriptions: DistinctValues,
    vendor_memos: DistinctValues,
    payment_methods: DistinctValues,
}

impl Group {
    fn new(vendor_name: &str) -> Self {
        Self {
            vendor_name: vendor_name.to_string(),
            descriptions: DistinctValues::default(),
            invoice_numbers: DistinctValues::default(),
            invoice_date: None,
            accounting_dates: DistinctValues::default(),
            due_date: None,
            currencies: DistinctValues::default(),
            total_units: 0,
            line_descriptions: DistinctValues::default(),
            vendor_memos: DistinctValues::default(),
            payment_methods: DistinctValues::default(),
        }
    }

    fn into_summary(self) -> GroupedSummary {
        GroupedSummary {
            vendor_name: self.vendor_name,
            description: wrap_display_literal(&self.descriptions.join(DESCRIPTION_SEPARATOR)),
            invoice_number: self.invoice_numbers.join(VALUE_SEPARATOR),
            invoice_date: self.invoice_date.map(format_iso).unwrap_or_default(),
            accounting_date: self.accounting_dates.join(VALUE_SEPARATOR),
            due_date: self.due_date.map(format_iso).unwrap_or_default(),
            currency: self.currencies.join(VALUE_SEPARATOR),
            line_item_amount: units_to_cents(self.total_units) as f64 / 100.0,
            line_item_description: self.line_descriptions.join(VALUE_SEPARATOR),
            vendor_memo: self.vendor_memos.join(VALUE_SEPARATOR),
            payment_method: self.payment_methods.join(VALUE_SEPARATOR),
        }
    }
}

/// Keep the later of the current value and a newly seen date cell
fn merge_latest(
    current: &mut Option<NaiveDate>,
    raw: &str,
    row: usize,
    field: ParseField,
    warnings: &mut Vec<ParseWarning>,
) {
    if raw.trim().is_empty() {
        return;
    }
    match parse_date(raw) {
        Some(date) => {
            if current.map_or(true, |latest| date > latest) {
                *current = Some(date);
            }
        }
        None => {
            warn!(row, %field, value = raw, "unparseable date ignored");
            warnings.push(ParseWarning {
                row,
                field,
                value: raw.to_string(),
            });
        }
    }
}

/// Group line items by vendor name and merge each group into one row
///
/// Groups come out in the order their vendor first appears.
pub fn aggregate(items: &[LineItem]) -> Vec<GroupedSummary> {
    let mut warnings = Vec::new();
    aggregate_with_warnings(items, &mut warnings)
}

/// Same as [`aggregate`], collecting the substitutions made along the way
///
/// Line items with a blank vendor name have no group and are left out.
pub fn aggregate_with_warnings(
    items: &[LineItem],
    warnings: &mut Vec<ParseWarning>,
) -> Vec<GroupedSummary> {
    let mut groups: Vec<Group> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for (idx, item) in items.iter().enumerate() {
        let row = idx + 1;

        if item.vendor_name.trim().is_empty() {
            warn!(row, "line item without vendor name left out of summary");
            continue;
        }

        let slot = match group_index.get(&item.vendor_name) {
            Some(&slot) => slot,
            None => {
                groups.push(Group::new(&item.vendor_name));
                group_index.insert(item.vendor_name.clone(), groups.len() - 1);
                groups.len() - 1
            }
        };
        let group = &mut groups[slot];

        group
            .descriptions
            .push(&strip_display_literal(&item.description));
        group
            .invoice_numbers
            .push(&strip_display_literal(&item.invoice_number));
        merge_latest(
            &mut group.invoice_date,
            &strip_display_literal(&item.invoice_date),
            row,
            ParseField::InvoiceDate,
            warnings,
        );
        group.accounting_dates.push(&item.accounting_date);
        merge_latest(
            &mut group.due_date,
            &strip_display_literal(&item.due_date),
            row,
            ParseField::DueDate,
            warnings,
        );
        group.currencies.push(&item.currency);

        let units = match parse_amount_units(&item.line_item_amount) {
            Some(units) => units,
            None => {
                if !item.line_item_amount.trim().is_empty() {
                    warn!(row, value = %item.line_item_amount, "unparseable amount counted as 0");
                    warnings.push(ParseWarning {
                        row,
                        field: ParseField::Amount,
                        value: item.line_item_amount.clone(),
                    });
                }
                0
            }
        };
        group.total_units = group.total_units.saturating_add(units);

        group.line_descriptions.push(&item.line_item_description);
        group.vendor_memos.push(&item.vendor_memo);
        group.payment_methods.push(&item.payment_method);
    }

    debug!(
        line_items = items.len(),
        vendors = groups.len(),
        "aggregated line items"
    );

    groups.into_iter().map(Group::into_summary).collect()
}
