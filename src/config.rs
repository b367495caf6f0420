// src/config.rs

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};

/// Tolerance used across the compiler unless overridden.
pub const DEFAULT_EPSILON: f64 = 1e-5;

/// Knobs for a compile pass.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```
/// use collision_compiler::config::CompileOptions;
///
/// let options = CompileOptions::from_json_str(r#"{ "parallel_packing": false }"#).unwrap();
/// assert_eq!(options.epsilon, 1e-5);
/// assert!(!options.parallel_packing);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Absolute tolerance for plane matching, orientation tests,
    /// k-d classification and point deduplication.
    pub epsilon: f64,
    /// Pack binary records on the rayon pool. Output bytes do not change.
    pub parallel_packing: bool,
    /// Write the human-readable dump next to the binary file.
    pub write_text_dump: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            parallel_packing: true,
            write_text_dump: false,
        }
    }
}

impl CompileOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: CompileOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Rejects a zero, negative or non-finite epsilon.
    pub fn validate(&self) -> Result<()> {
        if self.epsilon.is_finite() && self.epsilon > 0.0 {
            Ok(())
        } else {
            Err(CompileError::InvalidEpsilon { epsilon: self.epsilon })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let options = CompileOptions::from_json_str("{}").unwrap();
        assert_eq!(options, CompileOptions::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        let options =
            CompileOptions::from_json_str(r#"{ "epsilon": 0.001, "write_text_dump": true }"#).unwrap();
        assert_eq!(options.epsilon, 0.001);
        assert!(options.write_text_dump);
        assert!(options.parallel_packing);
    }

    #[test]
    fn test_malformed_json_is_a_config_error() {
        let err = CompileOptions::from_json_str("{ epsilon: ").unwrap_err();
        assert!(matches!(err, CompileError::Config(_)));
    }

    #[test]
    fn test_epsilon_must_be_positive() {
        for json in [r#"{ "epsilon": 0.0 }"#, r#"{ "epsilon": -0.001 }"#] {
            match CompileOptions::from_json_str(json) {
                Err(CompileError::InvalidEpsilon { epsilon }) => assert!(epsilon <= 0.0),
                other => panic!("expected InvalidEpsilon for {}, got {:?}", json, other),
            }
        }
        let nan = CompileOptions {
            epsilon: f64::NAN,
            ..CompileOptions::default()
        };
        assert!(matches!(nan.validate(), Err(CompileError::InvalidEpsilon { .. })));
    }
}
