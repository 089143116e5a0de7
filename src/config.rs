// ⚙️ Engine Config - tunable thresholds loaded from JSON
//
// Every field has a default, so an empty object (or no file at all) gives the
// stock behavior: warning above 60%, over above 80%, bills urgent within 5
// days.

use crate::cycle::{CycleEngine, CycleThresholds};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable pointing at a config file
pub const CONFIG_ENV: &str = "FINANCE_LEDGER_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub warning_threshold_pct: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub over_threshold_pct: Decimal,
    /// A bill due within this many days is urgent
    pub urgent_bill_days: i64,
    pub top_expenses: usize,
    pub recent_transactions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let thresholds = CycleThresholds::default();
        EngineConfig {
            warning_threshold_pct: thresholds.warning_pct,
            over_threshold_pct: thresholds.over_pct,
            urgent_bill_days: 5,
            top_expenses: 5,
            recent_transactions: 10,
        }
    }
}

impl EngineConfig {
    /// Load config from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(content).context("Failed to parse config JSON")?;
        config.thresholds()?;
        if config.urgent_bill_days < 0 {
            anyhow::bail!("urgent_bill_days must not be negative");
        }
        Ok(config)
    }

    pub fn thresholds(&self) -> crate::error::Result<CycleThresholds> {
        CycleThresholds::new(self.warning_threshold_pct, self.over_threshold_pct)
    }

    pub fn cycle_engine(&self) -> crate::error::Result<CycleEngine> {
        Ok(CycleEngine::new(self.thresholds()?))
    }
}
