//! Reconciliation settings, injected at the call site.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settings the engine needs beyond the datasets themselves. Always passed in
/// explicitly; the engine never reads ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Rate applied to trip revenue when the trip record carries none.
    pub default_gst_rate: Decimal,
    /// Lowercase substrings identifying fuel-type stock items by name.
    /// Extended at runtime by fuel-type expense category names.
    pub fuel_keywords: Vec<String>,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            default_gst_rate: Decimal::from(18),
            fuel_keywords: vec![
                "diesel".to_string(),
                "fuel".to_string(),
                "petrol".to_string(),
            ],
        }
    }
}
