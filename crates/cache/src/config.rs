//! Cache configuration with precedence: defaults < config file < environment
use crate::errors::{CacheError, RecoveryHint, Result, SerializationOp};
use crate::tier::{CacheTier, TierTtls};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the tiered cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live per tier
    pub ttls: TierTtls,
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default configuration
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
}

/// Loaded configuration plus where its last override came from
#[derive(Debug, Clone)]
pub struct CacheConfiguration {
    pub config: CacheConfig,
    pub source: ConfigSource,
}

/// Builder for creating cache configurations
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the TTL of a single tier
    pub fn with_ttl(mut self, tier: CacheTier, ttl: Duration) -> Self {
        set_ttl(&mut self.config.ttls, tier, ttl);
        self
    }

    pub fn build(self) -> CacheConfig {
        self.config
    }
}

const ENV_PREFIX: &str = "ALUMNI_CACHE_";

/// Configuration loader that handles precedence
pub struct CacheConfigLoader;

impl CacheConfigLoader {
    /// Load configuration with full precedence handling
    pub fn load() -> Result<CacheConfiguration> {
        let path = Self::get_config_file_path()?;
        Self::load_from(&path)
    }

    /// Load using an explicit config file location
    pub fn load_from(path: &Path) -> Result<CacheConfiguration> {
        let mut loaded = CacheConfiguration {
            config: CacheConfig::default(),
            source: ConfigSource::Default,
        };

        if let Some(overrides) = Self::load_from_config_file(path)? {
            apply_overrides(&mut loaded.config.ttls, &overrides);
            loaded.source = ConfigSource::ConfigFile(path.to_path_buf());
        }

        let env_overrides = Self::load_from_env()?;
        if !env_overrides.is_empty() {
            apply_overrides(&mut loaded.config.ttls, &env_overrides);
            loaded.source = ConfigSource::EnvironmentVariable(format!("{ENV_PREFIX}*"));
        }

        validate(&loaded.config)?;
        Ok(loaded)
    }

    /// Read `{"cache": {"ttl": {"hot": 60, ...}}}`, values in seconds
    fn load_from_config_file(path: &Path) -> Result<Option<Vec<(CacheTier, Duration)>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            operation: "read config file",
            source: e,
            recovery_hint: RecoveryHint::CheckPermissions {
                path: path.to_path_buf(),
            },
        })?;

        let file_config: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| CacheError::Serialization {
                key: path.display().to_string(),
                operation: SerializationOp::Decode,
                source: Box::new(e),
                recovery_hint: RecoveryHint::Manual {
                    instructions: "Check config file syntax".to_string(),
                },
            })?;

        let mut overrides = Vec::new();
        if let Some(ttl_obj) = file_config
            .get("cache")
            .and_then(|v| v.get("ttl"))
            .and_then(|v| v.as_object())
        {
            for tier in CONFIGURABLE {
                if let Some(secs) = ttl_obj.get(tier.as_str()).and_then(|v| v.as_u64()) {
                    overrides.push((tier, Duration::from_secs(secs)));
                }
            }
        }

        Ok(Some(overrides))
    }

    /// `ALUMNI_CACHE_HOT_TTL=30` style overrides, values in seconds
    fn load_from_env() -> Result<Vec<(CacheTier, Duration)>> {
        let mut overrides = Vec::new();
        for tier in CONFIGURABLE {
            let var = format!("{ENV_PREFIX}{}_TTL", tier.as_str().to_uppercase());
            if let Ok(raw) = std::env::var(&var) {
                let secs = raw.trim().parse::<u64>().map_err(|e| CacheError::Configuration {
                    message: format!("{var}={raw} is not a number of seconds: {e}"),
                    recovery_hint: RecoveryHint::Manual {
                        instructions: format!("Set {var} to a positive integer"),
                    },
                })?;
                overrides.push((tier, Duration::from_secs(secs)));
            }
        }
        Ok(overrides)
    }

    /// Get the configuration file path
    fn get_config_file_path() -> Result<PathBuf> {
        let config_dir = if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config_home)
        } else {
            dirs::config_dir().ok_or_else(|| CacheError::Configuration {
                message: "Could not determine config directory".to_string(),
                recovery_hint: RecoveryHint::Manual {
                    instructions: "Set XDG_CONFIG_HOME or HOME environment variable".to_string(),
                },
            })?
        };

        Ok(config_dir.join("alumni").join("cache.json"))
    }
}

// Search always follows the warm TTL, so it has no knob of its own.
const CONFIGURABLE: [CacheTier; 6] = [
    CacheTier::Hot,
    CacheTier::Warm,
    CacheTier::Cold,
    CacheTier::Metadata,
    CacheTier::Optimization,
    CacheTier::Popular,
];

fn set_ttl(ttls: &mut TierTtls, tier: CacheTier, ttl: Duration) {
    match tier {
        CacheTier::Hot => ttls.hot = ttl,
        CacheTier::Warm | CacheTier::Search => ttls.warm = ttl,
        CacheTier::Cold => ttls.cold = ttl,
        CacheTier::Metadata => ttls.metadata = ttl,
        CacheTier::Optimization => ttls.optimization = ttl,
        CacheTier::Popular => ttls.popular = ttl,
    }
}

fn apply_overrides(ttls: &mut TierTtls, overrides: &[(CacheTier, Duration)]) {
    for (tier, ttl) in overrides {
        set_ttl(ttls, *tier, *ttl);
    }
}

/// Longest TTL accepted for any tier
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

fn validate(config: &CacheConfig) -> Result<()> {
    for tier in CONFIGURABLE {
        if config.ttls.ttl(tier) > MAX_TTL {
            return Err(CacheError::Configuration {
                message: format!("{tier} TTL exceeds {} seconds", MAX_TTL.as_secs()),
                recovery_hint: RecoveryHint::Manual {
                    instructions: format!(
                        "Set {ENV_PREFIX}{}_TTL to at most one year",
                        tier.as_str().to_uppercase()
                    ),
                },
            });
        }
        if config.ttls.ttl(tier).is_zero() {
            return Err(CacheError::Configuration {
                message: format!("{tier} TTL must be greater than zero"),
                recovery_hint: RecoveryHint::Manual {
                    instructions: format!(
                        "Set {ENV_PREFIX}{}_TTL to a positive value",
                        tier.as_str().to_uppercase()
                    ),
                },
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        for tier in CONFIGURABLE {
            std::env::remove_var(format!("{ENV_PREFIX}{}_TTL", tier.as_str().to_uppercase()));
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_file_or_env() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let loaded = CacheConfigLoader::load_from(&dir.path().join("cache.json")).unwrap();
        assert_eq!(loaded.source, ConfigSource::Default);
        assert_eq!(loaded.config, CacheConfig::default());
    }

    #[test]
    #[serial]
    fn test_file_then_env_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, r#"{"cache": {"ttl": {"hot": 10, "cold": 500}}}"#).unwrap();

        let loaded = CacheConfigLoader::load_from(&path).unwrap();
        assert_eq!(loaded.source, ConfigSource::ConfigFile(path.clone()));
        assert_eq!(loaded.config.ttls.hot, Duration::from_secs(10));
        assert_eq!(loaded.config.ttls.cold, Duration::from_secs(500));
        assert_eq!(loaded.config.ttls.warm, Duration::from_secs(3600));

        std::env::set_var("ALUMNI_CACHE_HOT_TTL", "5");
        let loaded = CacheConfigLoader::load_from(&path).unwrap();
        clear_env();

        assert_eq!(loaded.config.ttls.hot, Duration::from_secs(5));
        assert_eq!(loaded.config.ttls.cold, Duration::from_secs(500));
        assert!(matches!(
            loaded.source,
            ConfigSource::EnvironmentVariable(_)
        ));
    }

    #[test]
    #[serial]
    fn test_rejects_bad_env_value() {
        clear_env();
        std::env::set_var("ALUMNI_CACHE_WARM_TTL", "soon");
        let dir = TempDir::new().unwrap();
        let result = CacheConfigLoader::load_from(&dir.path().join("cache.json"));
        clear_env();
        assert!(matches!(result, Err(CacheError::Configuration { .. })));
    }

    #[test]
    #[serial]
    fn test_rejects_zero_ttl() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, r#"{"cache": {"ttl": {"metadata": 0}}}"#).unwrap();
        let result = CacheConfigLoader::load_from(&path);
        assert!(matches!(result, Err(CacheError::Configuration { .. })));
    }

    #[test]
    #[serial]
    fn test_rejects_ttl_beyond_a_year() {
        clear_env();
        std::env::set_var("ALUMNI_CACHE_COLD_TTL", "18446744073709551615");
        let dir = TempDir::new().unwrap();
        let result = CacheConfigLoader::load_from(&dir.path().join("cache.json"));
        clear_env();
        assert!(matches!(result, Err(CacheError::Configuration { .. })));
    }

    #[test]
    fn test_builder_overrides_single_tier() {
        let config = CacheConfigBuilder::new()
            .with_ttl(CacheTier::Popular, Duration::from_secs(90))
            .build();
        assert_eq!(config.ttls.popular, Duration::from_secs(90));
        assert_eq!(config.ttls.hot, Duration::from_secs(60));
    }
}
