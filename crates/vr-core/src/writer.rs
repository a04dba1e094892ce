//! CSV output for the line-item export and the grouped summary

use crate::error::{Error, Result};
use crate::pipeline::RunOutput;
use crate::records::{export_columns, GroupedSummary, LineItem};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default file name of the ungrouped export
pub const DEFAULT_LINE_ITEMS_NAME: &str = "s1.csv";

/// Default file name of the grouped export
pub const DEFAULT_SUMMARY_NAME: &str = "s1_grouping.csv";

/// File names for the two outputs of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNames {
    pub line_items: String,
    pub summary: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            line_items: DEFAULT_LINE_ITEMS_NAME.to_string(),
            summary: DEFAULT_SUMMARY_NAME.to_string(),
        }
    }
}

impl OutputNames {
    /// Names prefixed with an input's file stem, for runs over several inputs
    pub fn prefixed(&self, stem: &str) -> Self {
        Self {
            line_items: format!("{stem}_{}", self.line_items),
            summary: format!("{stem}_{}", self.summary),
        }
    }
}

/// Paths written for one run
#[derive(Debug, Clone)]
pub struct WrittenFiles {
    pub line_items: PathBuf,
    pub summary: PathBuf,
}

/// Serialize records under the fixed export header
///
/// The header is written explicitly so an empty record set still produces
/// every column.
fn write_records<T: Serialize, W: Write>(out: W, records: &[T], label: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    let csv_err = |e: csv::Error| Error::Csv {
        path: label.to_path_buf(),
        source: e,
    };

    writer.write_record(export_columns::ALL).map_err(csv_err)?;
    for record in records {
        writer.serialize(record).map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_file<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let file = File::create(path)?;
    write_records(BufWriter::new(file), records, path)
}

fn write_string<T: Serialize>(records: &[T], label: &str) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, records, Path::new(label))?;
    String::from_utf8(buffer).map_err(|e| Error::CsvParse {
        path: PathBuf::from(label),
        message: e.to_string(),
    })
}

/// Write the ungrouped line-item export
pub fn write_line_items<P: AsRef<Path>>(path: P, items: &[LineItem]) -> Result<()> {
    write_file(path.as_ref(), items)
}

/// Write the grouped summary export
pub fn write_summary<P: AsRef<Path>>(path: P, summary: &[GroupedSummary]) -> Result<()> {
    write_file(path.as_ref(), summary)
}

/// Render the line-item export as CSV text
pub fn line_items_to_string(items: &[LineItem]) -> Result<String> {
    write_string(items, DEFAULT_LINE_ITEMS_NAME)
}

/// Render the grouped summary as CSV text
pub fn summary_to_string(summary: &[GroupedSummary]) -> Result<String> {
    write_string(summary, DEFAULT_SUMMARY_NAME)
}

/// Write both outputs of a run into a directory, creating it if needed
///
/// Both files are rendered before either is written. If the second write
/// fails the first file is removed, so a failed run leaves no export behind.
pub fn write_run_output<P: AsRef<Path>>(
    output: &RunOutput,
    output_dir: P,
    names: &OutputNames,
) -> Result<WrittenFiles> {
    let output_dir = output_dir.as_ref();

    let files = WrittenFiles {
        line_items: output_dir.join(&names.line_items),
        summary: output_dir.join(&names.summary),
    };

    let mut line_items = Vec::new();
    write_records(&mut line_items, &output.line_items, &files.line_items)?;
    let mut summary = Vec::new();
    write_records(&mut summary, &output.summary, &files.summary)?;

    fs::create_dir_all(output_dir)?;
    fs::write(&files.line_items, line_items)?;
    if let Err(e) = fs::write(&files.summary, summary) {
        if let Err(cleanup) = fs::remove_file(&files.line_items) {
            warn!(path = %files.line_items.display(), error = %cleanup, "failed to remove partial export");
        }
        return Err(e.into());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv_str;

    const HEADER: &str = "Vendor name,Description (optional),Invoice number,Invoice date,Accounting date (optional),Due date,Currency,Line item amount,Line item description,Vendor memo (optional),Payment method (optional)";

    #[test]
    fn test_empty_export_has_header() {
        let text = line_items_to_string(&[]).unwrap();
        assert_eq!(text.trim_end(), HEADER);
    }

    #[test]
    fn test_display_literal_is_csv_quoted() {
        let item = LineItem {
            vendor_name: "Acme, Inc".into(),
            description: "=\"0042\"".into(),
            currency: "USD".into(),
            line_item_amount: "10".into(),
            ..Default::default()
        };
        let text = line_items_to_string(&[item]).unwrap();
        let line = text.lines().nth(1).unwrap();

        assert_eq!(line, "\"Acme, Inc\",\"=\"\"0042\"\"\",,,,,USD,10,,,");
    }

    #[test]
    fn test_line_items_read_back() {
        let item = LineItem {
            vendor_name: "Acme".into(),
            description: "=\"0042\"".into(),
            invoice_number: "INV-1".into(),
            currency: "USD".into(),
            line_item_amount: "3.50".into(),
            ..Default::default()
        };
        let text = line_items_to_string(&[item.clone()]).unwrap();
        let table = parse_csv_str(&text, "s1.csv").unwrap();
        let items = LineItem::from_table(&table).unwrap();

        assert_eq!(items, vec![item]);
    }

    #[test]
    fn test_summary_amount_is_numeric() {
        let summary = GroupedSummary {
            vendor_name: "Acme".into(),
            description: "=\"\"".into(),
            currency: "USD".into(),
            line_item_amount: 100.01,
            ..Default::default()
        };
        let text = summary_to_string(&[summary]).unwrap();
        let line = text.lines().nth(1).unwrap();

        assert_eq!(line, "Acme,\"=\"\"\"\"\",,,,,USD,100.01,,,");
    }

    #[test]
    fn test_failed_summary_write_leaves_no_line_items() {
        let dir = tempfile::TempDir::new().unwrap();
        // A directory where the summary file should go makes that write fail
        fs::create_dir(dir.path().join(DEFAULT_SUMMARY_NAME)).unwrap();

        let output = RunOutput {
            line_items: vec![LineItem {
                vendor_name: "Acme".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let result = write_run_output(&output, dir.path(), &OutputNames::default());

        assert!(result.is_err());
        assert!(!dir.path().join(DEFAULT_LINE_ITEMS_NAME).exists());
    }

    #[test]
    fn test_write_run_output_creates_both_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("exports");
        let files = write_run_output(&RunOutput::default(), &out, &OutputNames::default()).unwrap();

        assert_eq!(fs::read_to_string(&files.line_items).unwrap().lines().count(), 1);
        assert!(files.summary.exists());
    }

    #[test]
    fn test_prefixed_names() {
        let names = OutputNames::default().prefixed("march");
        assert_eq!(names.line_items, "march_s1.csv");
        assert_eq!(names.summary, "march_s1_grouping.csv");
    }
}
