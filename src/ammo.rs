use serde::{Deserialize, Serialize};

/// One unit of work fed to a gun.
///
/// An ammo item is immutable once produced by the ammo source. The caller
/// owns it for the duration of a single `shoot` call; the gun does not
/// retain it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ammo {
    /// Opaque request description, e.g. a query string.
    pub payload: String,
    /// Classification label carried into the resulting sample.
    /// Non-empty by convention.
    pub tag: String,
}

impl Ammo {
    pub fn new(payload: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            tag: tag.into(),
        }
    }
}

/// Factory that produces a blank, typed [`Ammo`] instance.
///
/// The host's deserialization step fills the blank before the gun ever sees
/// it; parsing itself is the ammo provider's job, not ours.
pub type AmmoFactory = Box<dyn Fn() -> Ammo + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ammo_deserializes_from_host_line() {
        let ammo: Ammo =
            serde_json::from_str(r#"{"payload":"SELECT 1","tag":"ping"}"#).unwrap();
        assert_eq!(ammo.payload, "SELECT 1");
        assert_eq!(ammo.tag, "ping");
    }

    #[test]
    fn default_is_blank() {
        let blank = Ammo::default();
        assert!(blank.payload.is_empty());
        assert!(blank.tag.is_empty());
    }
}
