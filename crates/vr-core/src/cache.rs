//! Reference lookup kept across runs
//!
//! A host that processes many transaction files (an upload UI, a batch job)
//! builds the lookup once and hands the same [`VendorLookup`] to every run.
//! The cached lookup is rebuilt only when its reference file changes: a
//! different path, or a different modification time on the same path.

use crate::error::{Error, Result};
use crate::parser::parse_csv;
use crate::records::ReferenceRecord;
use crate::resolver::VendorLookup;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

/// A lookup built from a reference file, plus what is needed to tell when it is stale
#[derive(Debug, Clone)]
pub struct CachedLookup {
    path: PathBuf,
    modified: Option<SystemTime>,
    lookup: Arc<VendorLookup>,
}

fn modified_time(path: &Path) -> Result<Option<SystemTime>> {
    let metadata = fs::metadata(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    // Some filesystems do not report mtimes; such caches never refresh on their own
    Ok(metadata.modified().ok())
}

fn build_from_file(path: &Path) -> Result<VendorLookup> {
    let table = parse_csv(path)?;
    let records = ReferenceRecord::from_table(&table)?;
    Ok(VendorLookup::build(&records))
}

impl CachedLookup {
    /// Read a reference file and build its lookup
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let modified = modified_time(path)?;
        let lookup = build_from_file(path)?;

        info!(
            path = %path.display(),
            keys = lookup.len(),
            overwritten = lookup.overwritten(),
            "loaded reference lookup"
        );

        Ok(Self {
            path: path.to_path_buf(),
            modified,
            lookup: Arc::new(lookup),
        })
    }

    /// The shared, read-only lookup
    pub fn lookup(&self) -> Arc<VendorLookup> {
        Arc::clone(&self.lookup)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the reference file changed since the lookup was built
    pub fn is_stale(&self) -> Result<bool> {
        Ok(modified_time(&self.path)? != self.modified)
    }

    /// Rebuild if the reference file changed; returns whether a rebuild happened
    ///
    /// On error the previous lookup is kept.
    pub fn refresh(&mut self) -> Result<bool> {
        if !self.is_stale()? {
            debug!(path = %self.path.display(), "reference lookup is current");
            return Ok(false);
        }
        *self = Self::load(&self.path)?;
        Ok(true)
    }

    /// Point the cache at a different reference file, rebuilding unconditionally
    pub fn replace<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        *self = Self::load(path)?;
        Ok(())
    }
}
