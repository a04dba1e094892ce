//! Discovery of transaction CSV files for batch runs

use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Expand files and directories into a sorted, de-duplicated list of CSV files
///
/// Files named explicitly are kept whatever their extension. Directories are
/// walked recursively and contribute their `.csv` files, except those listed
/// in `exclude_names` (typically the run's own output file names).
pub fn discover_inputs<P: AsRef<Path>>(
    inputs: &[P],
    exclude_names: &[&str],
) -> Result<Vec<PathBuf>> {
    let mut found = BTreeSet::new();

    for input in inputs {
        let input = input.as_ref();

        if input.is_file() {
            found.insert(input.to_path_buf());
            continue;
        }

        if !input.is_dir() {
            return Err(Error::NoInputs(format!(
                "'{}' is neither a file nor a directory",
                input.display()
            )));
        }

        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_csv(path) {
                continue;
            }
            let excluded = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| {
                    exclude_names
                        .iter()
                        .any(|suffix| name == *suffix || name.ends_with(&format!("_{suffix}")))
                });
            if excluded {
                debug!(path = %path.display(), "skipping file named like a run output");
            } else {
                found.insert(path.to_path_buf());
            }
        }
    }

    if found.is_empty() {
        return Err(Error::NoInputs("no CSV files in the given inputs".to_string()));
    }

    Ok(found.into_iter().collect())
}

/// File stem used to prefix per-input output names
pub fn input_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string())
}

/// One distinct output prefix per input, in input order
///
/// Inputs are named by file stem. A stem already taken by an earlier input
/// gets the first free numeric suffix (`march`, `march_2`, ...), so no two
/// inputs of a batch write to the same files.
pub fn unique_stems(inputs: &[PathBuf]) -> Vec<String> {
    let stems: Vec<String> = inputs.iter().map(|p| input_stem(p)).collect();
    let mut used: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(stems.len());

    for (input, stem) in inputs.iter().zip(&stems) {
        let mut candidate = stem.clone();
        let mut n = 2;
        // Plain stems of later inputs stay reserved for those inputs
        while used.contains(&candidate) || (candidate != *stem && stems.contains(&candidate)) {
            candidate = format!("{stem}_{n}");
            n += 1;
        }
        if candidate != *stem {
            debug!(input = %input.display(), prefix = %candidate, "output prefix renamed to avoid collision");
        }
        used.insert(candidate.clone());
        unique.push(candidate);
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_csv() {
        assert!(is_csv(Path::new("a/b/march.csv")));
        assert!(is_csv(Path::new("MARCH.CSV")));
        assert!(!is_csv(Path::new("march.xlsx")));
        assert!(!is_csv(Path::new("csv")));
    }

    #[test]
    fn test_input_stem() {
        assert_eq!(input_stem(Path::new("in/march.csv")), "march");
        assert_eq!(input_stem(Path::new("/")), "input");
    }

    #[test]
    fn test_unique_stems_disambiguates_same_name() {
        let inputs = vec![
            PathBuf::from("east/march.csv"),
            PathBuf::from("west/march.csv"),
            PathBuf::from("april.csv"),
        ];
        assert_eq!(unique_stems(&inputs), vec!["march", "march_2", "april"]);
    }

    #[test]
    fn test_unique_stems_keeps_real_suffixed_names() {
        let inputs = vec![
            PathBuf::from("a/march.csv"),
            PathBuf::from("b/march.csv"),
            PathBuf::from("march_2.csv"),
        ];
        assert_eq!(unique_stems(&inputs), vec!["march", "march_3", "march_2"]);
    }

    #[test]
    fn test_output_named_files_skipped_only_in_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let named_like_output = dir.path().join("vendor_s1.csv");
        std::fs::write(&named_like_output, "a\n").unwrap();
        std::fs::write(dir.path().join("march.csv"), "a\n").unwrap();

        let walked = discover_inputs(&[dir.path()], &["s1.csv"]).unwrap();
        assert_eq!(walked, vec![dir.path().join("march.csv")]);

        let explicit = discover_inputs(&[named_like_output.as_path()], &["s1.csv"]).unwrap();
        assert_eq!(explicit, vec![named_like_output.clone()]);
    }

    #[test]
    fn test_missing_input_is_error() {
        let err = discover_inputs(&[PathBuf::from("definitely/not/here")], &[]).unwrap_err();
        assert!(matches!(err, Error::NoInputs(_)));
    }
}
