//! Job files describing a batch run
//!
//! A job names one reference file, any number of transaction inputs (files
//! or directories) and where to put the exports:
//!
//! ```json
//! {
//!   "reference": "compare.csv",
//!   "inputs": ["incoming/"],
//!   "output_dir": "exports",
//!   "outputs": { "line_items": "s1.csv", "summary": "s1_grouping.csv" }
//! }
//! ```

use crate::cache::CachedLookup;
use crate::error::{Error, Result};
use crate::parser::parse_csv;
use crate::pipeline::{run, RunReport};
use crate::scanner::{discover_inputs, unique_stems};
use crate::writer::{write_run_output, OutputNames, WrittenFiles};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A batch job definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    /// Reference (vendor master) CSV
    pub reference: PathBuf,
    /// Transaction CSV files or directories to scan
    pub inputs: Vec<PathBuf>,
    /// Directory receiving the exports
    pub output_dir: PathBuf,
    /// Output file names; prefixed with the input's stem when there are several inputs
    #[serde(default)]
    pub outputs: OutputNames,
}

impl JobFile {
    /// Load a job file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the job file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Outcome for one input of a batch
#[derive(Debug, Clone)]
pub struct InputResult {
    pub input: PathBuf,
    pub files: WrittenFiles,
    pub report: RunReport,
}

/// Outcome of a whole batch
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub processed: Vec<InputResult>,
    /// Inputs that failed (input path, error message); other inputs still ran
    pub errors: Vec<(PathBuf, String)>,
}

fn run_one(
    lookup: &CachedLookup,
    input: &Path,
    output_dir: &Path,
    names: &OutputNames,
) -> Result<InputResult> {
    let table = parse_csv(input)?;
    let output = run(&lookup.lookup(), &table)?;
    let files = write_run_output(&output, output_dir, names)?;
    Ok(InputResult {
        input: input.to_path_buf(),
        files,
        report: output.report,
    })
}

/// Run a job: one lookup build, then every discovered input against it
///
/// A reference problem aborts the job. A problem with one input is recorded
/// and the remaining inputs are still processed.
pub fn run_job(job: &JobFile) -> Result<BatchResult> {
    let lookup = CachedLookup::load(&job.reference)?;
    let exclude = [job.outputs.line_items.as_str(), job.outputs.summary.as_str()];
    let inputs = discover_inputs(&job.inputs, &exclude)?;
    let prefix_outputs = inputs.len() > 1;
    let stems = unique_stems(&inputs);

    let mut result = BatchResult::default();
    for (input, stem) in inputs.iter().zip(&stems) {
        let names = if prefix_outputs {
            job.outputs.prefixed(stem)
        } else {
            job.outputs.clone()
        };

        match run_one(&lookup, input, &job.output_dir, &names) {
            Ok(done) => result.processed.push(done),
            Err(e) => {
                warn!(input = %input.display(), error = %e, "input failed");
                result.errors.push((input.clone(), e.to_string()));
            }
        }
    }

    info!(
        processed = result.processed.len(),
        failed = result.errors.len(),
        "job complete"
    );

    Ok(result)
}
