//! Null-rate bookkeeping and replacement-value tracking.

use std::collections::BTreeMap;

use indexmap::IndexMap;

/// Column-name to missing-value fraction, as reported by the service.
/// Insertion order follows the dataset's column order.
pub type NullRateMap = IndexMap<String, f64>;

/// Column-name to user-supplied replacement string. Empty string is a valid,
/// explicit replacement, not "no replacement".
pub type FillValueMap = BTreeMap<String, String>;

/// Renders a null-rate fraction as a percentage with two decimals,
/// e.g. `0.2` becomes `20.00%`.
pub fn format_null_rate(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Owns per-column replacement values seeded from the current null rates and
/// the download reference the remediation call hands back.
#[derive(Debug, Default)]
pub struct NullRemediationTracker {
    rates: NullRateMap,
    fill_values: FillValueMap,
    download: Option<String>,
}

impl NullRemediationTracker {
    pub fn rates(&self) -> &NullRateMap {
        &self.rates
    }

    pub fn fill_values(&self) -> &FillValueMap {
        &self.fill_values
    }

    pub fn download(&self) -> Option<&str> {
        self.download.as_deref()
    }

    /// Installs a fresh null-rate map. Replacement values are reseeded to an
    /// empty string for exactly the new key set; prior entries and the
    /// previous download reference are dropped.
    pub fn replace_rates(&mut self, rates: NullRateMap) {
        self.fill_values = rates
            .keys()
            .map(|col| (col.clone(), String::new()))
            .collect();
        self.rates = rates;
        self.download = None;
    }

    /// Records a replacement value. Columns outside the current null-rate
    /// map are ignored; the key set never grows past it. Returns whether the
    /// column was accepted.
    pub fn set_replacement(&mut self, column: &str, value: &str) -> bool {
        if !self.rates.contains_key(column) {
            return false;
        }
        self.fill_values.insert(column.to_string(), value.to_string());
        true
    }

    pub fn set_download(&mut self, reference: String) -> &str {
        self.download.insert(reference)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
