use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of pooled backend connections shared by all shots.
fn default_pool_size() -> u32 {
    4
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target must be a non-empty connection descriptor")]
    EmptyTarget,
}

/// Static configuration a gun is constructed from.
///
/// Immutable after construction. The only required field is `target`, a
/// backend-specific connection descriptor (a DSN for the SQL backend, a
/// `mock://` descriptor for the mock one).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GunConfig {
    /// Connection descriptor for the backend, validated non-empty.
    pub target: String,

    /// Upper bound on pooled backend connections opened at bind time.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl GunConfig {
    pub fn new(target: impl Into<String>) -> Result<Self, ConfigError> {
        let conf = Self {
            target: target.into(),
            pool_size: default_pool_size(),
        };
        conf.validate()?;
        Ok(conf)
    }

    /// Re-check invariants for configs that arrived through `Deserialize`
    /// and therefore bypassed [`GunConfig::new`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_target_is_rejected() {
        assert_eq!(GunConfig::new("").unwrap_err(), ConfigError::EmptyTarget);
    }

    #[test]
    fn deserialized_config_gets_pool_default() {
        let conf: GunConfig =
            serde_json::from_str(r#"{"target":"mysql://db:3306/bench"}"#).unwrap();
        assert_eq!(conf.pool_size, 4);
        assert!(conf.validate().is_ok());
    }

    #[test]
    fn deserialized_empty_target_fails_validation() {
        let conf: GunConfig = serde_json::from_str(r#"{"target":""}"#).unwrap();
        assert_eq!(conf.validate().unwrap_err(), ConfigError::EmptyTarget);
    }
}
