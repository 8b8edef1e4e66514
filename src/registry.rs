use std::collections::HashMap;

use thiserror::Error;

use crate::ammo::{Ammo, AmmoFactory};
use crate::backend::MockBackend;
use crate::config::GunConfig;
use crate::gun::{Gun, QueryGun, SqlGun};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no gun registered under {0:?}")]
    UnknownGun(String),
    #[error("no ammo factory registered under {0:?}")]
    UnknownAmmo(String),
}

/// Factory that builds an unbound gun from its config.
pub type GunFactory = Box<dyn Fn(GunConfig) -> Box<dyn Gun> + Send + Sync>;

/// Explicit mapping from human-chosen names to gun and ammo factories.
///
/// The host builds one of these at startup, hands it to whatever reads
/// its configuration, and instantiates guns and blank ammo by name. The
/// registry is a plain value: independent hosts or tests can each hold
/// their own instance with no shared process state and no init-order
/// concerns.
#[derive(Default)]
pub struct Registry {
    guns: HashMap<String, GunFactory>,
    ammo: HashMap<String, AmmoFactory>,
}

impl Registry {
    /// An empty registry; register everything yourself.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in entries: the `"sql"` and `"mock"`
    /// guns, and the `"query"` ammo factory.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register_gun("sql", |conf| Box::new(SqlGun::new(conf)));
        reg.register_gun("mock", |conf| {
            Box::new(QueryGun::<MockBackend>::new(conf))
        });
        reg.register_ammo("query", Ammo::default);
        reg
    }

    pub fn register_gun<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(GunConfig) -> Box<dyn Gun> + Send + Sync + 'static,
    {
        self.guns.insert(name.into(), Box::new(factory));
    }

    pub fn register_ammo<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Ammo + Send + Sync + 'static,
    {
        self.ammo.insert(name.into(), Box::new(factory));
    }

    /// Instantiate an unbound gun registered under `name`.
    pub fn gun(&self, name: &str, conf: GunConfig) -> Result<Box<dyn Gun>, RegistryError> {
        let factory = self
            .guns
            .get(name)
            .ok_or_else(|| RegistryError::UnknownGun(name.to_string()))?;
        Ok(factory(conf))
    }

    /// Produce a blank ammo instance of the format registered under
    /// `name`, ready for the host's deserializer to fill.
    pub fn ammo(&self, name: &str) -> Result<Ammo, RegistryError> {
        let factory = self
            .ammo
            .get(name)
            .ok_or_else(|| RegistryError::UnknownAmmo(name.to_string()))?;
        Ok(factory())
    }

    /// Names of all registered guns, for host-side listings.
    pub fn gun_names(&self) -> impl Iterator<Item = &str> {
        self.guns.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_builtin_guns() {
        let reg = Registry::with_defaults();
        let mut names: Vec<_> = reg.gun_names().collect();
        names.sort_unstable();
        assert_eq!(names, ["mock", "sql"]);

        let gun = reg.gun("mock", GunConfig::new("mock://up").unwrap());
        assert!(gun.is_ok());
    }

    #[test]
    fn unknown_names_are_typed_errors() {
        let reg = Registry::with_defaults();
        assert_eq!(
            reg.gun("grpc", GunConfig::new("x").unwrap()).err(),
            Some(RegistryError::UnknownGun("grpc".into()))
        );
        assert_eq!(
            reg.ammo("protobuf").err(),
            Some(RegistryError::UnknownAmmo("protobuf".into()))
        );
    }

    #[test]
    fn blank_ammo_comes_from_the_named_factory() {
        let reg = Registry::with_defaults();
        assert_eq!(reg.ammo("query").unwrap(), Ammo::default());
    }

    #[test]
    fn independent_registries_do_not_share_entries() {
        let mut a = Registry::new();
        a.register_ammo("query", || Ammo::new("", "custom"));
        let b = Registry::new();

        assert!(a.ammo("query").is_ok());
        assert!(b.ammo("query").is_err());
    }
}
