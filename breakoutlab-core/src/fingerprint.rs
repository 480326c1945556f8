//! Run fingerprinting — deterministic identification of runs.
//!
//! A run is fingerprinted by hashing the canonical JSON serialization of
//! its configuration and its result with BLAKE3. Two runs over the same
//! bars with the same configuration must produce identical fingerprints;
//! the idempotence tests lean on this.

use crate::config::BacktestConfig;
use crate::engine::BacktestResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte BLAKE3 digest, rendered as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunFingerprint([u8; 32]);

impl RunFingerprint {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for RunFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Hash a configuration alone (for grouping sweep results).
pub fn config_fingerprint(config: &BacktestConfig) -> RunFingerprint {
    let json = serde_json::to_string(config).expect("BacktestConfig must serialize");
    RunFingerprint::from_bytes(json.as_bytes())
}

/// Hash configuration + full result (for reproducibility checks).
pub fn run_fingerprint(config: &BacktestConfig, result: &BacktestResult) -> RunFingerprint {
    let mut json = serde_json::to_string(config).expect("BacktestConfig must serialize");
    json.push('\n');
    json.push_str(&serde_json::to_string(result).expect("BacktestResult must serialize"));
    RunFingerprint::from_bytes(json.as_bytes())
}
