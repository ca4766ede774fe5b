//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Fixed duration of the trailing cross-resource correlation wave.
pub const CORRELATION_ANALYSIS_SECONDS: u32 = 60;

/// Planner configuration.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Estimated duration of the correlation wave.
    pub correlation_analysis_time: Duration,
    /// Per-worker timeout applied by the wave executor.
    pub worker_timeout: Duration,
    /// Maximum workers running at once inside a single wave.
    pub max_concurrent_workers: usize,
    /// Override for the embedded relationship catalog.
    pub relationships_path: Option<PathBuf>,
    /// Override for the embedded correlation rule book.
    pub rules_path: Option<PathBuf>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            correlation_analysis_time: Duration::from_secs(CORRELATION_ANALYSIS_SECONDS as u64),
            worker_timeout: Duration::from_secs(600), // 10 minutes
            max_concurrent_workers: 16,
            relationships_path: None,
            rules_path: None,
        }
    }
}

impl PlannerConfig {
    /// Build a config from `PLANNER_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64, _>(&lookup, "PLANNER_CORRELATION_SECS")? {
            config.correlation_analysis_time = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "PLANNER_WORKER_TIMEOUT_SECS")? {
            config.worker_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = parse_var::<usize, _>(&lookup, "PLANNER_MAX_CONCURRENT_WORKERS")? {
            if max == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "PLANNER_MAX_CONCURRENT_WORKERS".to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
            config.max_concurrent_workers = max;
        }
        config.relationships_path = lookup("PLANNER_RELATIONSHIPS_PATH").map(PathBuf::from);
        config.rules_path = lookup("PLANNER_RULES_PATH").map(PathBuf::from);

        Ok(config)
    }

    /// Correlation wave duration in whole seconds.
    pub fn correlation_seconds(&self) -> u32 {
        u32::try_from(self.correlation_analysis_time.as_secs()).unwrap_or(u32::MAX)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = PlannerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.correlation_seconds(), CORRELATION_ANALYSIS_SECONDS);
        assert_eq!(config.max_concurrent_workers, 16);
        assert!(config.relationships_path.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = PlannerConfig::from_lookup(lookup_from(&[
            ("PLANNER_CORRELATION_SECS", "90"),
            ("PLANNER_WORKER_TIMEOUT_SECS", "5"),
            ("PLANNER_MAX_CONCURRENT_WORKERS", "4"),
            ("PLANNER_RULES_PATH", "/tmp/rules.json"),
        ]))
        .unwrap();
        assert_eq!(config.correlation_seconds(), 90);
        assert_eq!(config.worker_timeout, Duration::from_secs(5));
        assert_eq!(config.max_concurrent_workers, 4);
        assert_eq!(config.rules_path, Some(PathBuf::from("/tmp/rules.json")));
    }

    #[test]
    fn rejects_unparsable_value() {
        let err = PlannerConfig::from_lookup(lookup_from(&[("PLANNER_CORRELATION_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "PLANNER_CORRELATION_SECS"
        ));
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err =
            PlannerConfig::from_lookup(lookup_from(&[("PLANNER_MAX_CONCURRENT_WORKERS", "0")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
