//! Vendor Recon CLI
//!
//! Command-line tool for resolving vendor names against a reference table and
//! producing the line-item and grouped invoice exports.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use vr_core::{
    custom_normalize, group_table, normalize, parse_csv, process_tables, run_job,
    write_run_output, write_summary, CachedLookup, JobFile, LookupKey, OutputNames, RunOutput,
    RunReport, VENDOR_ALIASES,
};

#[derive(Parser)]
#[command(name = "vr-cli")]
#[command(about = "Vendor name reconciliation and invoice grouping", long_about = None)]
#[command(version)]
struct Cli {
    /// Log pipeline details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a transaction file and write the line-item and grouped exports
    Process {
        /// Reference (vendor master) CSV; the first column holds display names
        #[arg(short, long)]
        reference: PathBuf,

        /// Transaction CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the exports
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// File name of the line-item export
        #[arg(long, default_value = vr_core::writer::DEFAULT_LINE_ITEMS_NAME)]
        line_items_name: String,

        /// File name of the grouped export
        #[arg(long, default_value = vr_core::writer::DEFAULT_SUMMARY_NAME)]
        summary_name: String,

        /// Export format; json writes the whole run (line items, summary, report)
        #[arg(long, value_enum, default_value = "csv")]
        format: Format,

        /// Also write the run report (counts and parse warnings) as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Group an existing line-item export
    Group {
        /// Line-item export (s1.csv)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: Format,
    },

    /// Run a job file: one reference, many transaction files
    Batch {
        /// Path to job file (JSON)
        #[arg(short, long)]
        job: PathBuf,
    },

    /// Create a job file template
    CreateJob {
        /// Output path for the job file
        #[arg(short, long)]
        output: PathBuf,

        /// Reference CSV
        #[arg(short, long, default_value = "compare.csv")]
        reference: PathBuf,

        /// Transaction files or directories
        #[arg(short, long)]
        input: Vec<PathBuf>,

        /// Output directory for exports
        #[arg(long, default_value = "exports")]
        export_dir: PathBuf,
    },

    /// Show how a vendor name and address resolve against the reference
    Resolve {
        /// Reference CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// Raw vendor name
        #[arg(long)]
        vendor: String,

        /// Address (both lines joined by a space)
        #[arg(long, default_value = "")]
        address: String,
    },

    /// Print the normalized keys for vendor names
    Normalize {
        /// Raw vendor names
        #[arg(required = true)]
        names: Vec<String>,

        /// Also list the alias table
        #[arg(long)]
        aliases: bool,
    },

    /// List the entries of a reference lookup
    Lookup {
        /// Reference CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// Maximum number of entries to display
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber; RUST_LOG takes precedence over --verbose
fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let default = if verbose { "vr_core=debug" } else { "vr_core=info" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> vr_core::Result<()> {
    match command {
        Commands::Process {
            reference,
            input,
            output_dir,
            line_items_name,
            summary_name,
            format,
            report,
        } => {
            let names = OutputNames {
                line_items: line_items_name,
                summary: summary_name,
            };
            cmd_process(&reference, &input, &output_dir, &names, format, report.as_deref())
        }
        Commands::Group {
            input,
            output,
            format,
        } => cmd_group(&input, &output, format),
        Commands::Batch { job } => cmd_batch(&job),
        Commands::CreateJob {
            output,
            reference,
            input,
            export_dir,
        } => cmd_create_job(&output, reference, input, export_dir),
        Commands::Resolve {
            reference,
            vendor,
            address,
        } => cmd_resolve(&reference, &vendor, &address),
        Commands::Normalize { names, aliases } => cmd_normalize(&names, aliases),
        Commands::Lookup { reference, limit } => cmd_lookup(&reference, limit),
    }
}

fn print_report(report: &RunReport) {
    println!("  {} transactions", report.transactions);
    println!(
        "  {} matched to reference, {} kept their raw name",
        report.matched, report.fallbacks
    );
    println!("  {} vendors in summary", report.summary_rows);

    if !report.warnings.is_empty() {
        println!("\nWarnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  {}", warning);
        }
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> vr_core::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

fn cmd_process(
    reference: &Path,
    input: &Path,
    output_dir: &Path,
    names: &OutputNames,
    format: Format,
    report_path: Option<&Path>,
) -> vr_core::Result<()> {
    let reference_table = parse_csv(reference)?;
    let input_table = parse_csv(input)?;

    let output = process_tables(&reference_table, &input_table)?;

    println!("Processed {}", input.display());
    print_report(&output.report);
    println!();

    match format {
        Format::Csv => {
            let files = write_run_output(&output, output_dir, names)?;
            println!(
                "Wrote {} line items to {}",
                output.line_items.len(),
                files.line_items.display()
            );
            println!(
                "Wrote {} vendor rows to {}",
                output.summary.len(),
                files.summary.display()
            );
        }
        Format::Json => {
            fs::create_dir_all(output_dir)?;
            let path = output_dir.join(&names.line_items).with_extension("json");
            write_json(&path, &output)?;
            println!("Wrote run output to {}", path.display());
        }
    }

    if let Some(path) = report_path {
        write_json(path, &output.report)?;
        println!("Wrote run report to {}", path.display());
    }

    Ok(())
}

fn cmd_group(input: &Path, output: &Path, format: Format) -> vr_core::Result<()> {
    let table = parse_csv(input)?;
    let run_output = group_table(&table)?;

    match format {
        Format::Csv => write_summary(output, &run_output.summary)?,
        Format::Json => write_json(output, &run_output)?,
    }

    let RunOutput {
        line_items,
        summary,
        report,
    } = run_output;

    println!(
        "Grouped {} line items into {} vendor rows",
        line_items.len(),
        summary.len()
    );
    if !report.warnings.is_empty() {
        println!("\nWarnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  {}", warning);
        }
    }
    println!("Exported to {}", output.display());

    Ok(())
}

fn cmd_batch(job_path: &Path) -> vr_core::Result<()> {
    let job = JobFile::load(job_path)?;

    println!("Running job with {} input location(s)", job.inputs.len());
    println!("Reference: {}", job.reference.display());
    println!("Output: {}", job.output_dir.display());
    println!();

    let result = run_job(&job)?;

    for done in &result.processed {
        println!("{}", done.input.display());
        print_report(&done.report);
        println!("  -> {}", done.files.line_items.display());
        println!("  -> {}", done.files.summary.display());
        println!();
    }

    println!("Batch complete:");
    println!("  {} inputs processed", result.processed.len());

    if !result.errors.is_empty() {
        println!("\nErrors ({}):", result.errors.len());
        for (path, err) in &result.errors {
            println!("  {}: {}", path.display(), err);
        }
    }

    Ok(())
}

fn cmd_create_job(
    output: &Path,
    reference: PathBuf,
    inputs: Vec<PathBuf>,
    export_dir: PathBuf,
) -> vr_core::Result<()> {
    let inputs = if inputs.is_empty() {
        vec![PathBuf::from("incoming")]
    } else {
        inputs
    };

    let job = JobFile {
        reference,
        inputs,
        output_dir: export_dir,
        outputs: OutputNames::default(),
    };

    job.save(output)?;
    println!("Created job file: {}", output.display());
    println!();
    println!("Edit the file to configure your job, then run:");
    println!("  vr-cli batch --job {}", output.display());

    Ok(())
}

fn cmd_resolve(reference: &Path, vendor: &str, address: &str) -> vr_core::Result<()> {
    let cache = CachedLookup::load(reference)?;
    let lookup = cache.lookup();

    println!("Vendor: {}", vendor);
    println!("Address: {}", address);
    println!();
    println!("Normalized: {}", normalize(vendor));
    let key = LookupKey::new(custom_normalize(vendor), address.trim().to_lowercase());
    println!("Lookup key: ({}, {})", key.clean_vendor_name, key.address_key);
    println!();

    match lookup.get_key(&key) {
        Some(display_name) => println!("Resolved: {}", display_name),
        None => println!("No reference match; keeps raw name: {}", vendor),
    }

    Ok(())
}

fn cmd_normalize(names: &[String], show_aliases: bool) -> vr_core::Result<()> {
    for name in names {
        println!("{}\t{}\t{}", name, normalize(name), custom_normalize(name));
    }

    if show_aliases {
        println!();
        println!("Aliases ({}):", VENDOR_ALIASES.len());
        for (from, to) in VENDOR_ALIASES {
            println!("  {} -> {}", from, to);
        }
        println!("  *charter* -> {}", vr_core::normalize::CHARTER_KEY);
    }

    Ok(())
}

fn cmd_lookup(reference: &Path, limit: Option<usize>) -> vr_core::Result<()> {
    let cache = CachedLookup::load(reference)?;
    let lookup = cache.lookup();
    let entries = lookup.entries();

    println!("Reference: {}", reference.display());
    println!("Keys: {}", lookup.len());
    if lookup.overwritten() > 0 {
        println!(
            "Overwritten: {} (reference rows sharing a key; the later row wins)",
            lookup.overwritten()
        );
    }
    println!();

    println!("Vendor key\tAddress key\tDisplay name");
    println!("{}", "-".repeat(48));

    let row_limit = limit.unwrap_or(entries.len());
    for (key, display_name) in entries.iter().take(row_limit) {
        println!("{}\t{}\t{}", key.clean_vendor_name, key.address_key, display_name);
    }

    if entries.len() > row_limit {
        println!("... ({} more entries)", entries.len() - row_limit);
    }

    Ok(())
}
