//! Diff engine configuration.

use serde::{Deserialize, Serialize};

/// Default maximum nesting depth for value comparison
pub const DEFAULT_MAX_VALUE_DEPTH: usize = 256;

/// Configuration for one reconciliation run
///
/// Comparison is always exact; there is no tolerance setting here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Values nested deeper than this are reported as changed without
    /// being compared further
    pub max_value_depth: usize,
    /// Look up `NodeRef` referents so a change of referent type is
    /// categorized as a type change
    pub resolve_reference_types: bool,
    /// Record an ambiguity whenever an application id bucket is paired
    /// positionally
    pub flag_positional_pairing: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_value_depth: DEFAULT_MAX_VALUE_DEPTH,
            resolve_reference_types: true,
            flag_positional_pairing: true,
        }
    }
}

impl DiffConfig {
    /// Set the maximum value nesting depth
    #[must_use]
    pub fn with_max_value_depth(mut self, depth: usize) -> Self {
        self.max_value_depth = depth;
        self
    }

    /// Enable or disable referent type resolution
    #[must_use]
    pub fn with_resolve_reference_types(mut self, enabled: bool) -> Self {
        self.resolve_reference_types = enabled;
        self
    }

    /// Enable or disable positional pairing ambiguity records
    #[must_use]
    pub fn with_flag_positional_pairing(mut self, enabled: bool) -> Self {
        self.flag_positional_pairing = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiffConfig::default();
        assert_eq!(config.max_value_depth, DEFAULT_MAX_VALUE_DEPTH);
        assert!(config.resolve_reference_types);
        assert!(config.flag_positional_pairing);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DiffConfig = serde_json::from_str(r#"{"max_value_depth": 8}"#).unwrap();
        assert_eq!(config.max_value_depth, 8);
        assert!(config.resolve_reference_types);
    }

    #[test]
    fn test_builder() {
        let config = DiffConfig::default()
            .with_max_value_depth(4)
            .with_resolve_reference_types(false)
            .with_flag_positional_pairing(false);
        assert_eq!(config.max_value_depth, 4);
        assert!(!config.resolve_reference_types);
        assert!(!config.flag_positional_pairing);
    }
}
