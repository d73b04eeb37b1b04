use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::hasher::{HashAlgorithm, SaltPolicy};

/// Salt value that selects per-invocation random salting instead of a
/// fixed salt.
pub const RANDOM_SALT: &str = "random";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Offset applied when interpreting log clock fields and the source
    /// file's modification time. The log grammar itself is offset-free.
    pub utc_offset_minutes: i32,
    pub hasher: HasherConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    pub algorithm: HashAlgorithm,
    /// Salt for the record identity hash. The literal `"random"` selects
    /// a fresh random salt per record, which makes identifiers
    /// non-reproducible across runs.
    pub salt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// services(5) database consulted for port/protocol names.
    pub services_path: String,
    /// Reverse DNS can be switched off for offline runs; every address
    /// then enriches to `"unknown"`.
    pub reverse_dns: bool,
}

impl Config {
    /// Load configuration from file or environment variables.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("UFWLOG_CONFIG_FILE")
            .unwrap_or_else(|_| "/etc/ufwlog/config.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!(
                "Config file not found at {}, using environment variables",
                config_path
            );
            Self::from_env()
        };

        // Environment variables override file config.
        if let Ok(offset) = std::env::var("UFWLOG_UTC_OFFSET_MINUTES") {
            if let Ok(offset) = offset.parse() {
                config.utc_offset_minutes = offset;
            }
        }
        if let Ok(algorithm) = std::env::var("UFWLOG_HASH_ALGORITHM") {
            config.hasher.algorithm = algorithm.parse()?;
        }
        if let Ok(salt) = std::env::var("UFWLOG_SALT") {
            config.hasher.salt = salt;
        }
        if let Ok(path) = std::env::var("UFWLOG_SERVICES_PATH") {
            config.resolver.services_path = path;
        }
        if let Ok(reverse) = std::env::var("UFWLOG_REVERSE_DNS") {
            if let Ok(reverse) = reverse.parse() {
                config.resolver.reverse_dns = reverse;
            }
        }

        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            utc_offset_minutes: std::env::var("UFWLOG_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            hasher: HasherConfig {
                algorithm: std::env::var("UFWLOG_HASH_ALGORITHM")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default(),
                salt: std::env::var("UFWLOG_SALT").unwrap_or_else(|_| "ufwlog".to_string()),
            },
            resolver: ResolverConfig {
                services_path: std::env::var("UFWLOG_SERVICES_PATH")
                    .unwrap_or_else(|_| "/etc/services".to_string()),
                reverse_dns: std::env::var("UFWLOG_REVERSE_DNS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
            },
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        // UTC offsets span -14:00 to +14:00.
        if self.utc_offset_minutes.abs() > 14 * 60 {
            return Err(format!(
                "utc_offset_minutes must be within ±840, got {}",
                self.utc_offset_minutes
            ));
        }
        if self.hasher.salt.trim().is_empty() {
            return Err("hasher.salt must not be empty".to_string());
        }
        if self.resolver.services_path.is_empty() {
            return Err("resolver.services_path must not be empty".to_string());
        }
        Ok(())
    }
}

impl HasherConfig {
    /// Interpret the configured salt value as a policy.
    pub fn salt_policy(&self) -> SaltPolicy {
        if self.salt == RANDOM_SALT {
            SaltPolicy::Random
        } else {
            SaltPolicy::Fixed(self.salt.clone())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            hasher: HasherConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Md5,
            salt: "ufwlog".to_string(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            services_path: "/etc/services".to_string(),
            reverse_dns: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.utc_offset_minutes, 0);
        assert_eq!(config.hasher.algorithm, HashAlgorithm::Md5);
        assert_eq!(config.resolver.services_path, "/etc/services");
        assert!(config.resolver.reverse_dns);
    }

    #[test]
    fn test_toml_deserialization() {
        let config: Config = toml::from_str(
            r#"
            utc_offset_minutes = 120

            [hasher]
            algorithm = "sha1"
            salt = "pepper"

            [resolver]
            services_path = "/tmp/services"
            reverse_dns = false
            "#,
        )
        .unwrap();

        assert_eq!(config.utc_offset_minutes, 120);
        assert_eq!(config.hasher.algorithm, HashAlgorithm::Sha1);
        assert_eq!(config.hasher.salt, "pepper");
        assert_eq!(config.resolver.services_path, "/tmp/services");
        assert!(!config.resolver.reverse_dns);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [hasher]
            algorithm = "bcrypt"
            "#,
        )
        .unwrap();

        assert_eq!(config.hasher.algorithm, HashAlgorithm::Bcrypt);
        assert_eq!(config.hasher.salt, "ufwlog");
        assert_eq!(config.utc_offset_minutes, 0);
    }

    #[test]
    fn test_validate_rejects_out_of_range_offset() {
        let mut config = Config::default();
        config.utc_offset_minutes = 15 * 60;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("utc_offset_minutes"));
    }

    #[test]
    fn test_validate_rejects_blank_salt() {
        let mut config = Config::default();
        config.hasher.salt = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_services_path() {
        let mut config = Config::default();
        config.resolver.services_path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_salt_policy_random_sentinel() {
        let mut hasher = HasherConfig::default();
        assert_eq!(
            hasher.salt_policy(),
            SaltPolicy::Fixed("ufwlog".to_string())
        );

        hasher.salt = RANDOM_SALT.to_string();
        assert_eq!(hasher.salt_policy(), SaltPolicy::Random);
    }
}
