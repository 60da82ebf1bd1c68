//! Physical key identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// A physical key as reported by the capture source.
///
/// Identifiers are normalized to upper case so `"w"` and `"W"` name the
/// same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PhysicalKey(String);

impl PhysicalKey {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PhysicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhysicalKey {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PhysicalKey {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<PhysicalKey> for String {
    fn from(key: PhysicalKey) -> Self {
        key.0
    }
}

impl From<device_query::Keycode> for PhysicalKey {
    fn from(keycode: device_query::Keycode) -> Self {
        use device_query::Keycode as DK;
        // Digits come through as Key0..Key9; everything else keeps its
        // variant name, which already matches the letter for A-Z.
        let name = match keycode {
            DK::Key0 => "0".to_string(),
            DK::Key1 => "1".to_string(),
            DK::Key2 => "2".to_string(),
            DK::Key3 => "3".to_string(),
            DK::Key4 => "4".to_string(),
            DK::Key5 => "5".to_string(),
            DK::Key6 => "6".to_string(),
            DK::Key7 => "7".to_string(),
            DK::Key8 => "8".to_string(),
            DK::Key9 => "9".to_string(),
            other => format!("{:?}", other),
        };
        Self::new(name)
    }
}
