//! Reference lookup and vendor name resolution
//!
//! The lookup maps `(custom_normalize(vendor name), address key)` to the
//! reference table's display name. It is built once per reference input and
//! only read afterwards.
//!
//! Two reference rows that normalize to the same key silently collapse: the
//! later row wins. That usually points at a duplicate in the vendor master
//! upstream, so the count of overwritten keys is kept for inspection rather
//! than treated as an error.

use crate::normalize::custom_normalize;
use crate::records::{ReferenceRecord, TransactionRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Normalized vendor name plus address key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LookupKey {
    pub clean_vendor_name: String,
    pub address_key: String,
}

impl LookupKey {
    pub fn new(clean_vendor_name: impl Into<String>, address_key: impl Into<String>) -> Self {
        Self {
            clean_vendor_name: clean_vendor_name.into(),
            address_key: address_key.into(),
        }
    }

    /// Key for a reference row
    pub fn for_reference(record: &ReferenceRecord) -> Self {
        Self::new(
            custom_normalize(&record.vendor_name_raw),
            record.address_key(),
        )
    }

    /// Key for a transaction row
    pub fn for_transaction(record: &TransactionRecord) -> Self {
        Self::new(
            custom_normalize(&record.vendor_name_raw),
            record.address_key(),
        )
    }
}

/// Outcome of resolving one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Found in the reference lookup
    Matched(String),
    /// Not found; carries the transaction's raw vendor name unchanged
    Fallback(String),
}

impl Resolution {
    pub fn is_match(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Resolution::Matched(name) | Resolution::Fallback(name) => name,
        }
    }

    pub fn into_name(self) -> String {
        match self {
            Resolution::Matched(name) | Resolution::Fallback(name) => name,
        }
    }
}

/// Read-only map from [`LookupKey`] to display name
#[derive(Debug, Clone, Default)]
pub struct VendorLookup {
    entries: HashMap<LookupKey, String>,
    overwritten: usize,
}

impl VendorLookup {
    /// Build the lookup from reference records; later records overwrite earlier ones
    pub fn build(records: &[ReferenceRecord]) -> Self {
        let mut entries = HashMap::with_capacity(records.len());
        let mut overwritten = 0;

        for record in records {
            let key = LookupKey::for_reference(record);
            if let Some(previous) = entries.insert(key, record.display_name.clone()) {
                trace!(previous = %previous, current = %record.display_name, "lookup key overwritten");
                overwritten += 1;
            }
        }

        debug!(
            records = records.len(),
            keys = entries.len(),
            overwritten,
            "built vendor lookup"
        );

        Self {
            entries,
            overwritten,
        }
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many reference rows replaced an earlier row with the same key
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }

    /// Look up a raw vendor name and a raw (single-line) address
    pub fn get(&self, vendor_name: &str, address: &str) -> Option<&str> {
        let key = LookupKey::new(custom_normalize(vendor_name), address.trim().to_lowercase());
        self.get_key(&key)
    }

    pub fn get_key(&self, key: &LookupKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Resolve a transaction to its display name, falling back to its raw name
    pub fn resolve(&self, transaction: &TransactionRecord) -> Resolution {
        let key = LookupKey::for_transaction(transaction);
        match self.get_key(&key) {
            Some(display_name) => Resolution::Matched(display_name.to_string()),
            None => {
                trace!(
                    vendor = %key.clean_vendor_name,
                    address = %key.address_key,
                    "no reference match, keeping raw vendor name"
                );
                Resolution::Fallback(transaction.vendor_name_raw.clone())
            }
        }
    }

    /// All entries sorted by key
    pub fn entries(&self) -> Vec<(&LookupKey, &str)> {
        let mut entries: Vec<(&LookupKey, &str)> = self
            .entries
            .iter()
            .map(|(k, v)| (k, v.as_str()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
