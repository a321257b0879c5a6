//! Run configuration and branch derivation.

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use graphdelta_diff::DiffConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Segment marking the version under test
pub const TESTING_SEGMENT: &str = "/testing";

/// Segment marking the reference version
pub const RELEASE_SEGMENT: &str = "/release";

/// Settings for one diff run, read from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Label of the version under test
    pub test_label: Option<String>,
    /// Label of the reference version
    pub reference_label: Option<String>,
    /// Comparison tolerance; accepted but not interpreted
    pub tolerance: Option<f64>,
    /// Engine settings
    pub diff: DiffConfig,
}

impl RunConfig {
    /// Read a config file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&bytes).wrap_err_with(|| format!("invalid config {}", path.display()))
    }

    /// Parse a config document
    ///
    /// # Errors
    ///
    /// Returns error if the document is not a valid config
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Derive the reference counterpart of a test path or label
///
/// Replaces every `/testing` segment with `/release`. Returns `None` when
/// there is nothing to replace.
#[must_use]
pub fn derive_reference(test: &str) -> Option<String> {
    test.contains(TESTING_SEGMENT)
        .then(|| test.replace(TESTING_SEGMENT, RELEASE_SEGMENT))
}
