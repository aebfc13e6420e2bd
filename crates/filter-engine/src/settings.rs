use crate::{error::SettingsError, types::parse_env_as_type};
use model::core::value::Value;
use serde::{Deserialize, Serialize};

pub const MAX_PATH_DEPTH_VAR: &str = "FILTER_MAX_PATH_DEPTH";
pub const LOG_COMPILED_VAR: &str = "FILTER_LOG_COMPILED";

const DEFAULT_MAX_PATH_DEPTH: usize = 16;

/// Knobs for the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Longest property path accepted, counted in segments.
    pub max_path_depth: usize,
    /// Log the rendered predicate at debug level after compiling.
    pub log_compiled: bool,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
            log_compiled: false,
        }
    }
}

impl CompilerSettings {
    /// Defaults overridden by `FILTER_MAX_PATH_DEPTH` and `FILTER_LOG_COMPILED`.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CompilerSettings::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup(MAX_PATH_DEPTH_VAR) {
            let depth = match parse_env_as_type(&raw, &Value::Uint(0)) {
                Some(Value::Uint(depth)) => usize::try_from(depth).ok(),
                _ => None,
            };
            settings.max_path_depth = depth.ok_or_else(|| SettingsError::EnvParseError {
                var: MAX_PATH_DEPTH_VAR.to_string(),
                value: raw.clone(),
                expected_type: "unsigned integer".to_string(),
            })?;
        }

        if let Some(raw) = lookup(LOG_COMPILED_VAR) {
            settings.log_compiled = match parse_env_as_type(&raw, &Value::Boolean(false)) {
                Some(Value::Boolean(flag)) => flag,
                _ => {
                    return Err(SettingsError::EnvParseError {
                        var: LOG_COMPILED_VAR.to_string(),
                        value: raw,
                        expected_type: "boolean".to_string(),
                    });
                }
            };
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_path_depth == 0 {
            return Err(SettingsError::Invalid {
                name: "max_path_depth".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = CompilerSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, CompilerSettings::default());
        assert_eq!(settings.max_path_depth, 16);
        assert!(!settings.log_compiled);
    }

    #[test]
    fn test_overrides() {
        let settings = CompilerSettings::from_lookup(lookup(&[
            (MAX_PATH_DEPTH_VAR, "4"),
            (LOG_COMPILED_VAR, "true"),
        ]))
        .unwrap();
        assert_eq!(settings.max_path_depth, 4);
        assert!(settings.log_compiled);
    }

    #[test]
    fn test_invalid_values() {
        let err = CompilerSettings::from_lookup(lookup(&[(MAX_PATH_DEPTH_VAR, "deep")]))
            .unwrap_err();
        assert!(
            matches!(err, SettingsError::EnvParseError { ref var, .. } if var == MAX_PATH_DEPTH_VAR)
        );

        let err = CompilerSettings::from_lookup(lookup(&[(LOG_COMPILED_VAR, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::EnvParseError { .. }));

        let err = CompilerSettings::from_lookup(lookup(&[(MAX_PATH_DEPTH_VAR, "0")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { .. }));
    }
}
