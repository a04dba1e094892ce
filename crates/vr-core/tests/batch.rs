use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use vr_core::{
    parse_csv, run_job, CachedLookup, GroupedSummary, JobFile, LineItem, OutputNames, Table,
};

const REFERENCE: &str = "Display Name,Vendor Name,Address
Granite Communications Inc,Granite Telecommunications,123 Main St
Spectrum Business,Charter Communications,PO Box 60074
";

const HEADER: &str = "Vendor Name 1,Vendor Address 1,Vendor Address 2,Customer Vendor Account Number,Invoice Number,Invoice Date,Due Date,Net Amount,Cust Id";

fn write(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

fn transactions(rows: &[&str]) -> String {
    let mut csv = format!("{HEADER}\n");
    for row in rows {
        csv.push_str(row);
        csv.push('\n');
    }
    csv
}

fn summary_rows(path: &Path) -> Table {
    parse_csv(path).unwrap()
}

#[test]
fn single_input_uses_default_names() {
    let dir = TempDir::new().unwrap();
    let reference = dir.path().join("compare.csv");
    let input = dir.path().join("input.csv");
    write(&reference, REFERENCE);
    write(
        &input,
        &transactions(&[
            "GRANITE TELECOMMUNICATIONS 45,123 Main St,,0099,INV-1,01/05/2024,02/05/2024,100.005,C1",
        ]),
    );

    let job = JobFile {
        reference,
        inputs: vec![input],
        output_dir: dir.path().join("out"),
        outputs: OutputNames::default(),
    };
    let result = run_job(&job).unwrap();

    assert!(result.errors.is_empty());
    assert_eq!(result.processed.len(), 1);
    assert_eq!(result.processed[0].report.matched, 1);

    let line_items = LineItem::from_table(&parse_csv(dir.path().join("out/s1.csv")).unwrap()).unwrap();
    assert_eq!(line_items[0].vendor_name, "Granite Communications Inc");
    assert_eq!(line_items[0].description, "=\"0099\"");
    assert_eq!(line_items[0].invoice_date, "2024-01-05");

    let summary = summary_rows(&dir.path().join("out/s1_grouping.csv"));
    assert_eq!(summary.row_count(), 1);
    let amount = summary.require_column("Line item amount").unwrap();
    assert_eq!(summary.rows[0].get(amount), "100.01");
}

#[test]
fn directory_inputs_share_one_lookup_and_prefix_outputs() {
    let dir = TempDir::new().unwrap();
    let reference = dir.path().join("compare.csv");
    let incoming = dir.path().join("incoming");
    fs::create_dir_all(incoming.join("nested")).unwrap();
    write(&reference, REFERENCE);
    write(
        &incoming.join("march.csv"),
        &transactions(&["Charter Communications 12,PO Box 60074,,A1,7,2024-03-01,2024-03-31,50,C1"]),
    );
    write(
        &incoming.join("nested/april.csv"),
        &transactions(&["CHARTER (SPECTRUM),po box 60074,,A2,8,2024-04-01,2024-04-30,25,C1"]),
    );
    write(&incoming.join("notes.txt"), "not a table");

    let job = JobFile {
        reference,
        inputs: vec![incoming],
        output_dir: dir.path().join("exports"),
        outputs: OutputNames::default(),
    };
    let result = run_job(&job).unwrap();

    assert_eq!(result.processed.len(), 2);
    assert!(dir.path().join("exports/march_s1.csv").exists());
    assert!(dir.path().join("exports/april_s1_grouping.csv").exists());
    for done in &result.processed {
        assert_eq!(done.report.matched, 1);
        assert_eq!(done.report.fallbacks, 0);
    }
}

#[test]
fn same_stem_in_different_folders_writes_separate_outputs() {
    let dir = TempDir::new().unwrap();
    let reference = dir.path().join("compare.csv");
    let incoming = dir.path().join("incoming");
    fs::create_dir_all(incoming.join("east")).unwrap();
    fs::create_dir_all(incoming.join("west")).unwrap();
    write(&reference, REFERENCE);
    write(
        &incoming.join("east/march.csv"),
        &transactions(&["East Vendor,1 Main,,,1,,,10,"]),
    );
    write(
        &incoming.join("west/march.csv"),
        &transactions(&["West Vendor,2 Main,,,2,,,20,"]),
    );

    let job = JobFile {
        reference,
        inputs: vec![incoming],
        output_dir: dir.path().join("exports"),
        outputs: OutputNames::default(),
    };
    let result = run_job(&job).unwrap();

    assert_eq!(result.processed.len(), 2);
    assert!(result.errors.is_empty());
    assert_ne!(
        result.processed[0].files.line_items,
        result.processed[1].files.line_items
    );

    let east = LineItem::from_table(&parse_csv(dir.path().join("exports/march_s1.csv")).unwrap()).unwrap();
    let west =
        LineItem::from_table(&parse_csv(dir.path().join("exports/march_2_s1.csv")).unwrap()).unwrap();
    assert_eq!(east[0].vendor_name, "East Vendor");
    assert_eq!(west[0].vendor_name, "West Vendor");
    assert!(dir.path().join("exports/march_2_s1_grouping.csv").exists());
}

#[test]
fn bad_input_is_reported_and_others_continue() {
    let dir = TempDir::new().unwrap();
    let reference = dir.path().join("compare.csv");
    let good = dir.path().join("good.csv");
    let bad = dir.path().join("bad.csv");
    write(&reference, REFERENCE);
    write(&good, &transactions(&["Acme,1 Main,,,1,,,3,"]));
    write(&bad, "Vendor Name 1,Net Amount\nAcme,3\n");

    let job = JobFile {
        reference,
        inputs: vec![good, bad.clone()],
        output_dir: dir.path().join("out"),
        outputs: OutputNames::default(),
    };
    let result = run_job(&job).unwrap();

    assert_eq!(result.processed.len(), 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].0, bad);
    assert!(result.errors[0].1.contains("Vendor Address 1"));
    assert!(!dir.path().join("out/bad_s1.csv").exists());
}

#[test]
fn bad_reference_aborts_the_job() {
    let dir = TempDir::new().unwrap();
    let reference = dir.path().join("compare.csv");
    let input = dir.path().join("input.csv");
    write(&reference, "Display,Vendor Name\nA,B\n");
    write(&input, &transactions(&["Acme,1 Main,,,1,,,3,"]));

    let job = JobFile {
        reference,
        inputs: vec![input],
        output_dir: dir.path().join("out"),
        outputs: OutputNames::default(),
    };

    assert!(run_job(&job).unwrap_err().is_schema_error());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn cached_lookup_rebuilds_only_when_reference_changes() {
    let dir = TempDir::new().unwrap();
    let reference = dir.path().join("compare.csv");
    write(&reference, REFERENCE);

    let mut cache = CachedLookup::load(&reference).unwrap();
    assert_eq!(cache.lookup().len(), 2);
    assert!(!cache.refresh().unwrap());

    write(
        &reference,
        &format!("{REFERENCE}Windstream Communications LLC,Windstream,PO Box 9001\n"),
    );
    File::options()
        .write(true)
        .open(&reference)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();

    assert!(cache.is_stale().unwrap());
    assert!(cache.refresh().unwrap());
    assert_eq!(cache.lookup().len(), 3);
    assert_eq!(
        cache.lookup().get("WINDSTREAM 4", "po box 9001"),
        Some("Windstream Communications LLC")
    );
}

#[test]
fn summary_type_matches_export_columns() {
    let summary = GroupedSummary::default();
    let text = vr_core::summary_to_string(&[summary]).unwrap();
    let table = vr_core::parse_csv_str(&text, "s1_grouping.csv").unwrap();

    assert_eq!(table.column_count(), 11);
    assert_eq!(table.columns[0].name, "Vendor name");
    assert_eq!(table.columns[10].name, "Payment method (optional)");
}
